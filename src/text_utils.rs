use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Count characters (Unicode scalar values).
pub(crate) fn char_count(content: &str) -> usize {
    content.chars().count()
}

/// Convert a character index to a byte index in a UTF-8 string.
pub(crate) fn char_to_byte_idx(content: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    match content.char_indices().nth(char_idx) {
        Some((idx, _)) => idx,
        None => content.len(),
    }
}

/// Display width of a single character in cells. Control characters and
/// combining marks are zero-width.
pub(crate) fn char_width(ch: char) -> f32 {
    UnicodeWidthChar::width(ch).unwrap_or(0) as f32
}

/// Split a line into word-boundary segments, each as (char offset, char count).
/// Offsets are relative to the start of `content`.
pub(crate) fn word_segments(content: &str) -> Vec<(usize, usize)> {
    let mut segments = Vec::new();
    let mut offset = 0;
    for word in content.split_word_bounds() {
        let len = char_count(word);
        segments.push((offset, len));
        offset += len;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte_idx_multibyte() {
        let s = "añb";
        assert_eq!(char_to_byte_idx(s, 0), 0);
        assert_eq!(char_to_byte_idx(s, 2), 3);
        assert_eq!(char_to_byte_idx(s, 9), s.len());
    }

    #[test]
    fn test_char_width_cjk_and_combining() {
        assert_eq!(char_width('a'), 1.0);
        assert_eq!(char_width('你'), 2.0);
        assert_eq!(char_width('\u{0301}'), 0.0);
    }

    #[test]
    fn test_word_segments() {
        let segs = word_segments("ab cd");
        assert_eq!(segs, vec![(0, 2), (2, 1), (3, 2)]);
    }
}
