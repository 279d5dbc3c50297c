//! Helvetica advance widths and line breaking.

use super::Font;

/// Advance widths of printable ASCII (0x20..=0x7E) in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

fn char_width(c: char, font: Font) -> u16 {
    let widths = match font {
        Font::Regular => &HELVETICA_WIDTHS,
        Font::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    match c as u32 {
        code @ 0x20..=0x7E => widths[(code - 0x20) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c, font) as u32).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap. Explicit newlines always break; words wider than
/// `max_width` are split between characters.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_owned()
            } else {
                format!("{line} {word}")
            };
            if text_width(&candidate, font, size) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if text_width(word, font, size) <= max_width {
                line = word.to_owned();
            } else {
                for c in word.chars() {
                    line.push(c);
                    if text_width(&line, font, size) > max_width && line.chars().count() > 1 {
                        line.pop();
                        lines.push(std::mem::take(&mut line));
                        line.push(c);
                    }
                }
            }
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        // "Hi" = 722 + 222
        assert!((text_width("Hi", Font::Regular, 10.0) - 9.44).abs() < 1e-4);
        // "Hi" = 722 + 278
        assert!((text_width("Hi", Font::Bold, 10.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_bold_widths_are_per_glyph() {
        // Same advance in both faces.
        assert_eq!(char_width('W', Font::Bold), char_width('W', Font::Regular));
        assert_eq!(char_width('0', Font::Bold), 556);
        // Narrow regular glyphs widen far more than 8% in bold.
        assert_eq!(char_width('l', Font::Regular), 222);
        assert_eq!(char_width('l', Font::Bold), 278);
        assert_eq!(char_width('?', Font::Bold), 611);
        assert_eq!(char_width('~', Font::Bold), 584);
    }

    #[test]
    fn test_wrap_breaks_on_width() {
        let lines = wrap("aaa bbb ccc", Font::Regular, 10.0, 40.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let lines = wrap("first\n\nthird", Font::Regular, 10.0, 500.0);
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap("mmmmmmmmmm", Font::Regular, 10.0, 30.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "mmmmmmmmmm");
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 30.0);
        }
    }
}
