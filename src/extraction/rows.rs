//! Rebuilds delivery-board rows from three independently recognized columns.
//!
//! The left and right columns hold several fragments per row, each row closed
//! by a marker fragment; the middle column holds exactly one per row. Rows are
//! only emitted where every column contributed, so a column that recognized
//! fewer rows truncates the result instead of producing a partial row.

use std::time::Duration;

use crate::errors::EfClawResult;
use crate::perception::calibration::BoardRegions;
use crate::perception::traits::Perception;
use crate::perception::types::{CaptureFrame, DetectedRegion};

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    fragments: Vec<DetectedRegion>,
}

impl Row {
    pub fn new(fragments: Vec<DetectedRegion>) -> Self {
        Self { fragments }
    }

    pub fn fragments(&self) -> &[DetectedRegion] {
        &self.fragments
    }

    pub fn first(&self) -> Option<&DetectedRegion> {
        self.fragments.first()
    }

    pub fn get(&self, index: usize) -> Option<&DetectedRegion> {
        self.fragments.get(index)
    }

    /// Last fragment of the row: the accept control.
    pub fn action(&self) -> Option<&DetectedRegion> {
        self.fragments.last()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Groups consecutive fragments, closing a group on (and including) each
/// fragment whose text contains `marker`. A trailing unclosed group is kept.
pub fn split_by_marker(
    items: impl IntoIterator<Item = DetectedRegion>,
    marker: &str,
) -> Vec<Vec<DetectedRegion>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();

    for item in items {
        if !item.has_text() {
            continue;
        }
        let closes = item.text.contains(marker);
        current.push(item);
        if closes {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Row `i` = left group `i` + middle fragment `i` + right group `i`.
pub fn assemble_rows(
    left_groups: Vec<Vec<DetectedRegion>>,
    middle: Vec<DetectedRegion>,
    right_groups: Vec<Vec<DetectedRegion>>,
) -> Vec<Row> {
    left_groups
        .into_iter()
        .zip(middle)
        .zip(right_groups)
        .map(|((mut left, mid), right)| {
            left.push(mid);
            left.extend(right);
            Row::new(left)
        })
        .collect()
}

fn reading_order(mut items: Vec<DetectedRegion>) -> Vec<DetectedRegion> {
    items.retain(DetectedRegion::has_text);
    items.sort_by_key(|r| (r.y, r.x));
    items
}

pub async fn reconstruct_rows<P: Perception + ?Sized>(
    perception: &P,
    frame: CaptureFrame,
    left_marker: &str,
    right_marker: &str,
) -> EfClawResult<Vec<Row>> {
    let regions = BoardRegions::for_frame(frame)?;

    let left = reading_order(
        perception
            .recognize_text(Some(regions.left), None, Duration::ZERO)
            .await?,
    );
    let right = reading_order(
        perception
            .recognize_text(Some(regions.right), None, Duration::ZERO)
            .await?,
    );
    let middle = reading_order(
        perception
            .recognize_text(Some(regions.middle), None, Duration::ZERO)
            .await?,
    );

    let left_groups = split_by_marker(left, left_marker);
    let right_groups = split_by_marker(right, right_marker);
    tracing::debug!(
        left = left_groups.len(),
        middle = middle.len(),
        right = right_groups.len(),
        "board columns grouped"
    );

    Ok(assemble_rows(left_groups, middle, right_groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EfClawError;
    use crate::testing::{fragment, ScriptedPerception};

    fn texts(group: &[DetectedRegion]) -> Vec<&str> {
        group.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn marker_closes_group_and_trailing_group_survives() {
        let items = vec![
            fragment(0, 0, "武陵城"),
            fragment(0, 20, "查看位置"),
            fragment(0, 40, "   "),
            fragment(0, 60, "供能高地"),
            fragment(0, 80, "查看位置"),
            fragment(0, 100, "矿脉源区"),
        ];
        let groups = split_by_marker(items, "查看位置");

        assert_eq!(groups.len(), 3);
        assert_eq!(texts(&groups[0]), vec!["武陵城", "查看位置"]);
        assert_eq!(texts(&groups[1]), vec!["供能高地", "查看位置"]);
        assert_eq!(texts(&groups[2]), vec!["矿脉源区"]);
    }

    #[test]
    fn row_count_is_min_of_columns() {
        let left = vec![
            vec![fragment(0, 0, "a"), fragment(0, 10, "查看位置")],
            vec![fragment(0, 20, "b"), fragment(0, 30, "查看位置")],
        ];
        let right = vec![
            vec![fragment(0, 0, "接取运送委托")],
            vec![fragment(0, 20, "接取运送委托")],
            vec![fragment(0, 40, "接取运送委托")],
        ];
        let middle = vec![fragment(0, 5, "易损"), fragment(0, 25, "不易损")];

        let rows = assemble_rows(left, middle, right);

        assert_eq!(rows.len(), 2);
        assert_eq!(texts(rows[1].fragments()), vec!["b", "查看位置", "不易损", "接取运送委托"]);
        assert_eq!(rows[0].action().unwrap().text, "接取运送委托");
    }

    #[test]
    fn empty_column_yields_no_rows() {
        let left = vec![vec![fragment(0, 0, "a")]];
        assert!(assemble_rows(left, Vec::new(), vec![vec![fragment(0, 0, "x")]]).is_empty());
    }

    #[tokio::test]
    async fn reconstructs_rows_from_calibrated_columns() {
        let frame = CaptureFrame::new(1920, 1080);
        let regions = BoardRegions::for_frame(frame).unwrap();
        let perception = ScriptedPerception::new(frame, move |query| {
            let region = query.region();
            if region == Some(regions.left) {
                // recognition order is not reading order
                vec![
                    fragment(920, 400, "查看位置"),
                    fragment(920, 370, "武陵城"),
                    fragment(920, 520, "源石研究园"),
                    fragment(920, 550, "查看位置"),
                ]
            } else if region == Some(regions.middle) {
                vec![fragment(610, 380, "易损"), fragment(610, 530, "极易损")]
            } else if region == Some(regions.right) {
                vec![
                    fragment(1630, 400, "接取运送委托"),
                    fragment(1630, 550, "接取运送委托"),
                ]
            } else {
                Vec::new()
            }
        });

        let rows = reconstruct_rows(&perception, frame, "查看位置", "接取运送委托")
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(texts(rows[0].fragments()), vec!["武陵城", "查看位置", "易损", "接取运送委托"]);
        assert_eq!(rows[1].first().unwrap().text, "源石研究园");
        assert_eq!(perception.queries().len(), 3);
    }

    #[tokio::test]
    async fn unsupported_ratio_surfaces_before_recognition() {
        let frame = CaptureFrame::new(1366, 768);
        let perception = ScriptedPerception::sequence(frame, Vec::new());

        let result = reconstruct_rows(&perception, frame, "查看位置", "接取运送委托").await;

        assert!(matches!(result, Err(EfClawError::CalibrationUnsupported { .. })));
        assert!(perception.queries().is_empty());
    }
}
