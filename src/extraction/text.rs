//! OCR text clean-up shared by the row and panel extractors.

/// Removes every whitespace character, including the spaces OCR inserts
/// between CJK glyphs.
pub fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
        || ('\u{3400}'..='\u{4dbf}').contains(&c)
        || ('\u{f900}'..='\u{faff}').contains(&c)
}

fn is_title_separator(c: char) -> bool {
    matches!(c, '·' | '・' | '•' | '‧' | ':' | '：')
}

/// Title text: compacted, dot-like separators unified to `：`.
pub fn normalize_title(text: &str) -> String {
    compact(text)
        .chars()
        .map(|c| if is_title_separator(c) { '：' } else { c })
        .collect()
}

/// Splits a trailing `+N` (one or two digits) level off a compacted entry.
pub fn split_level_suffix(text: &str) -> (&str, Option<u8>) {
    let head = text.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &text[head.len()..];
    match head.strip_suffix('+') {
        Some(name) if (1..=2).contains(&digits.len()) => (name, digits.parse().ok()),
        _ => (text, None),
    }
}

/// Level of a standalone `+N` fragment.
pub fn parse_level(text: &str) -> Option<u8> {
    let compacted = compact(text);
    let digits = compacted.strip_prefix('+')?;
    if !(1..=2).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Entry name: compacted, `+N` suffix removed, and when the text is CJK the
/// stray latin letters / punctuation OCR glues onto either end are trimmed.
pub fn normalize_entry(text: &str) -> String {
    let compacted = compact(text);
    let (name, _) = split_level_suffix(&compacted);
    if name.chars().any(is_cjk) {
        name.trim_matches(|c: char| !is_cjk(c)).to_string()
    } else {
        name.trim_matches(|c: char| !c.is_alphanumeric()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_drops_inner_spaces() {
        assert_eq!(compact(" 四 号 谷 底\t"), "四号谷底");
    }

    #[test]
    fn title_separators_are_unified() {
        assert_eq!(normalize_title("无 瑕 基质 · 流 转"), "无瑕基质：流转");
        assert_eq!(normalize_title("无瑕基质：流转"), "无瑕基质：流转");
    }

    #[test]
    fn entry_noise_is_trimmed() {
        assert_eq!(normalize_entry("o攻击提升"), "攻击提升");
        assert_eq!(normalize_entry("。攻击 提升+2"), "攻击提升");
        assert_eq!(normalize_entry("流 转+1"), "流转");
        assert_eq!(normalize_entry("+3"), "");
    }

    #[test]
    fn levels_parse_only_from_level_fragments() {
        assert_eq!(parse_level("+2"), Some(2));
        assert_eq!(parse_level(" + 3 "), Some(3));
        assert_eq!(parse_level("攻击提升+2"), None);
        assert_eq!(split_level_suffix("意志提升+1"), ("意志提升", Some(1)));
        assert_eq!(split_level_suffix("意志提升"), ("意志提升", None));
    }
}
