//! Essence panel parser.
//!
//! The panel shows a title, an optional source line, a marker word, and then
//! exactly three entries. OCR hands the boxes back in no particular order and
//! mixes in stray fragments, so the parser orders them top-to-bottom, splits at
//! the marker, discards noise, and keeps the first three surviving entries.
//! Anything less than three is a parse failure (`None`); callers poll until
//! the panel becomes readable.

use std::time::Duration;

use crate::errors::EfClawResult;
use crate::extraction::text::{
    compact, normalize_entry, normalize_title, parse_level, split_level_suffix,
};
use crate::perception::traits::Perception;
use crate::perception::types::{DetectedRegion, ScreenRect};

pub const ENTRY_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct PanelRecord {
    pub title: String,
    pub source: String,
    pub entries: [String; ENTRY_COUNT],
    pub entry_regions: [DetectedRegion; ENTRY_COUNT],
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelEntry {
    pub name: String,
    pub level: Option<u8>,
    pub region: DetectedRegion,
}

/// A parsed panel together with its level-annotated entries.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelReading {
    pub record: PanelRecord,
    pub entries: Vec<PanelEntry>,
}

#[derive(Debug, Clone)]
pub struct PanelParser {
    marker: String,
}

impl PanelParser {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: compact(&marker.into()),
        }
    }

    pub fn parse_panel(&self, fragments: &[DetectedRegion]) -> Option<PanelRecord> {
        let mut ordered: Vec<&DetectedRegion> = fragments.iter().filter(|f| f.has_text()).collect();
        ordered.sort_by_key(|f| (f.y, f.x));

        let marker_at = ordered
            .iter()
            .position(|f| compact(&f.text).contains(self.marker.as_str()))?;
        if marker_at == 0 {
            tracing::debug!("panel marker found without a title above it");
            return None;
        }

        let title = normalize_title(&ordered[0].text);
        let source = ordered[1..marker_at]
            .first()
            .map(|f| compact(&f.text))
            .unwrap_or_default();

        let (names, regions): (Vec<String>, Vec<DetectedRegion>) = ordered[marker_at + 1..]
            .iter()
            .filter_map(|f| {
                let name = normalize_entry(&f.text);
                (!name.is_empty()).then(|| (name, (*f).clone()))
            })
            .take(ENTRY_COUNT)
            .unzip();

        if names.len() < ENTRY_COUNT {
            tracing::debug!(found = names.len(), "panel has too few entries");
            return None;
        }

        Some(PanelRecord {
            title,
            source,
            entries: names.try_into().ok()?,
            entry_regions: regions.try_into().ok()?,
        })
    }
}

/// Annotates each entry with the `+N` level fragment vertically closest to
/// it. Entries keep their panel order; when two levels land on one entry the
/// nearer one wins. An entry with no level fragment falls back to a `+N`
/// suffix recognized inside its own text.
pub fn attach_levels(panel: &PanelRecord, level_fragments: &[DetectedRegion]) -> Vec<PanelEntry> {
    let mut nearest: [Option<(i32, u8)>; ENTRY_COUNT] = [None; ENTRY_COUNT];

    for fragment in level_fragments {
        let Some(level) = parse_level(&fragment.text) else {
            continue;
        };
        let y = fragment.center().y;
        let closest = panel
            .entry_regions
            .iter()
            .enumerate()
            .map(|(i, region)| (i, (region.center().y - y).abs()))
            .min_by_key(|&(_, distance)| distance);
        if let Some((index, distance)) = closest {
            if nearest[index].map_or(true, |(best, _)| distance < best) {
                nearest[index] = Some((distance, level));
            }
        }
    }

    panel
        .entries
        .iter()
        .zip(&panel.entry_regions)
        .zip(nearest)
        .map(|((name, region), hit)| PanelEntry {
            name: name.clone(),
            level: hit
                .map(|(_, level)| level)
                .or_else(|| split_level_suffix(&compact(&region.text)).1),
            region: region.clone(),
        })
        .collect()
}

/// Recognizes the panel region once and parses it.
pub async fn read_panel<P: Perception + ?Sized>(
    perception: &P,
    parser: &PanelParser,
    region: Option<ScreenRect>,
) -> EfClawResult<Option<PanelReading>> {
    let fragments = perception
        .recognize_text(region, None, Duration::ZERO)
        .await?;
    let (levels, rest): (Vec<DetectedRegion>, Vec<DetectedRegion>) = fragments
        .into_iter()
        .partition(|f| parse_level(&f.text).is_some());

    let Some(record) = parser.parse_panel(&rest) else {
        return Ok(None);
    };
    let entries = attach_levels(&record, &levels);
    tracing::info!(
        title = %record.title,
        entries = ?entries.iter().map(|e| (e.name.as_str(), e.level)).collect::<Vec<_>>(),
        "panel read"
    );
    Ok(Some(PanelReading { record, entries }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::types::CaptureFrame;
    use crate::testing::ScriptedPerception;

    fn r(x: i32, y: i32, w: i32, h: i32, text: &str) -> DetectedRegion {
        DetectedRegion::new(x, y, w, h, text)
    }

    fn parser() -> PanelParser {
        PanelParser::new("附加技能")
    }

    #[test]
    fn parses_title_source_and_three_entries() {
        let boxes = vec![
            r(100, 10, 300, 24, "无瑕基质：流转"),
            r(120, 55, 180, 20, "四号谷底"),
            r(120, 85, 180, 20, "附加技能"),
            r(120, 120, 260, 20, "智识提升"),
            r(120, 150, 260, 20, "o攻击提升"),
            r(120, 180, 260, 20, "流转"),
        ];

        let panel = parser().parse_panel(&boxes).unwrap();

        assert_eq!(panel.title, "无瑕基质：流转");
        assert_eq!(panel.source, "四号谷底");
        assert_eq!(panel.entries, ["智识提升", "攻击提升", "流转"].map(String::from));
        assert_eq!(panel.entry_regions[1].y, 150);
    }

    #[test]
    fn tolerates_spaces_symbols_and_shuffled_input() {
        let boxes = vec![
            r(120, 180, 260, 20, "流 转+1"),
            r(120, 85, 180, 20, "附 加 技 能"),
            r(100, 10, 300, 24, "无 瑕 基质 · 流 转"),
            r(120, 150, 260, 20, "。攻击 提升+2"),
            r(120, 55, 180, 20, "四 号 谷 底"),
            r(120, 120, 260, 20, "意志 提升+1"),
        ];

        let panel = parser().parse_panel(&boxes).unwrap();

        assert_eq!(panel.title, "无瑕基质：流转");
        assert_eq!(panel.source, "四号谷底");
        assert_eq!(panel.entries, ["意志提升", "攻击提升", "流转"].map(String::from));
    }

    #[test]
    fn missing_source_is_empty() {
        let boxes = vec![
            r(100, 10, 300, 24, "无瑕基质：流转"),
            r(120, 85, 180, 20, "附加技能"),
            r(120, 120, 260, 20, "意志提升"),
            r(120, 150, 260, 20, "攻击提升"),
            r(120, 180, 260, 20, "流转"),
        ];
        let panel = parser().parse_panel(&boxes).unwrap();
        assert_eq!(panel.source, "");
    }

    #[test]
    fn excess_candidates_keep_topmost_three() {
        let boxes = vec![
            r(100, 10, 300, 24, "标题"),
            r(120, 85, 180, 20, "附加技能"),
            r(120, 120, 260, 20, "甲"),
            r(120, 135, 260, 20, "·"),
            r(120, 150, 260, 20, "乙"),
            r(120, 180, 260, 20, "丙"),
            r(120, 210, 260, 20, "丁"),
        ];
        let panel = parser().parse_panel(&boxes).unwrap();
        assert_eq!(panel.entries, ["甲", "乙", "丙"].map(String::from));
    }

    #[test]
    fn fewer_than_three_candidates_is_absent() {
        let mut boxes = vec![
            r(100, 10, 300, 24, "标题"),
            r(120, 55, 180, 20, "来源"),
            r(120, 85, 180, 20, "附加技能"),
        ];
        for (i, name) in ["甲", "+2", "乙"].into_iter().enumerate() {
            boxes.push(r(120, 120 + 30 * i as i32, 260, 20, name));
            assert!(parser().parse_panel(&boxes).is_none());
        }
        // noise in front of the marker does not count as an entry
        let before_marker = vec![
            r(100, 10, 300, 24, "标题"),
            r(120, 20, 180, 20, "甲"),
            r(120, 30, 180, 20, "乙"),
            r(120, 40, 180, 20, "丙"),
            r(120, 85, 180, 20, "附加技能"),
        ];
        assert!(parser().parse_panel(&before_marker).is_none());
    }

    #[test]
    fn missing_marker_or_title_is_absent() {
        let no_marker = vec![
            r(100, 10, 300, 24, "标题"),
            r(120, 120, 260, 20, "甲"),
            r(120, 150, 260, 20, "乙"),
            r(120, 180, 260, 20, "丙"),
        ];
        assert!(parser().parse_panel(&no_marker).is_none());

        let marker_first = vec![
            r(120, 5, 180, 20, "附加技能"),
            r(120, 120, 260, 20, "甲"),
            r(120, 150, 260, 20, "乙"),
            r(120, 180, 260, 20, "丙"),
        ];
        assert!(parser().parse_panel(&marker_first).is_none());
    }

    fn sample_panel() -> PanelRecord {
        parser()
            .parse_panel(&[
                r(100, 10, 300, 24, "无瑕基质：流转"),
                r(120, 85, 180, 20, "附加技能"),
                r(120, 120, 260, 20, "意志提升"),
                r(120, 150, 260, 20, "。攻击提升"),
                r(120, 180, 260, 20, "流转"),
            ])
            .unwrap()
    }

    #[test]
    fn levels_attach_by_vertical_proximity() {
        let panel = sample_panel();
        let levels = vec![
            r(460, 120, 60, 18, "+1"),
            r(460, 150, 60, 18, "+2"),
            r(460, 180, 60, 18, "+3"),
        ];

        let entries = attach_levels(&panel, &levels);

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["意志提升", "攻击提升", "流转"]);
        let got: Vec<_> = entries.iter().map(|e| e.level).collect();
        assert_eq!(got, [Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn level_order_never_reorders_entries() {
        let panel = sample_panel();
        let levels = vec![
            r(460, 182, 60, 18, "+3"),
            r(460, 118, 60, 18, "+1"),
            r(460, 149, 60, 18, "+2"),
        ];

        let entries = attach_levels(&panel, &levels);

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["意志提升", "攻击提升", "流转"]);
        let got: Vec<_> = entries.iter().map(|e| e.level).collect();
        assert_eq!(got, [Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn unmatched_entry_falls_back_to_inline_suffix() {
        let panel = parser()
            .parse_panel(&[
                r(100, 10, 300, 24, "标题"),
                r(120, 85, 180, 20, "附加技能"),
                r(120, 120, 260, 20, "意志提升+1"),
                r(120, 150, 260, 20, "攻击提升"),
                r(120, 180, 260, 20, "流转"),
            ])
            .unwrap();

        let levels = [r(460, 181, 60, 18, "+3"), r(460, 40, 60, 18, "noise")];
        let entries = attach_levels(&panel, &levels);

        let got: Vec<_> = entries.iter().map(|e| e.level).collect();
        assert_eq!(got, [Some(1), None, Some(3)]);
    }

    #[tokio::test]
    async fn read_panel_separates_level_fragments() {
        let frame = CaptureFrame::new(1920, 1080);
        let perception = ScriptedPerception::sequence(
            frame,
            vec![vec![
                r(460, 150, 60, 18, "+2"),
                r(100, 10, 300, 24, "无瑕基质：流转"),
                r(120, 55, 180, 20, "四号谷底"),
                r(120, 85, 180, 20, "附加技能"),
                r(120, 120, 260, 20, "智识提升"),
                r(120, 150, 260, 20, "攻击提升"),
                r(120, 180, 260, 20, "流转"),
            ]],
        );

        let reading = read_panel(&perception, &parser(), None).await.unwrap().unwrap();

        assert_eq!(reading.record.source, "四号谷底");
        let got: Vec<_> = reading.entries.iter().map(|e| e.level).collect();
        assert_eq!(got, [None, Some(2), None]);
        assert!(read_panel(&perception, &parser(), None).await.unwrap().is_none());
    }
}
