//! Subtitle line wrapping

/// Column limit for subtitle lines, indent included.
pub const SUBTITLE_WIDTH: usize = 76;

/// Indent for subtitle lines under a cue label.
pub const SUBTITLE_INDENT: &str = "     ";

/// Greedily wrap `text` into lines of at most `width` characters, each
/// starting with `indent`. Whitespace runs collapse to one space; words
/// longer than a line are split.
#[must_use]
pub fn wrap(text: &str, width: usize, indent: &str) -> Vec<String> {
    let indent_len = indent.chars().count();
    let room = width.saturating_sub(indent_len).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        // Split words that cannot fit on any line
        while word.len() > room {
            if current_len > 0 {
                lines.push(format!("{indent}{current}"));
                current.clear();
                current_len = 0;
            }
            let rest = word.split_off(room);
            lines.push(format!("{indent}{}", word.iter().collect::<String>()));
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > room {
            lines.push(format!("{indent}{current}"));
            current.clear();
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        lines.push(format!("{indent}{current}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_text() {
        assert_eq!(wrap("Hey there, kid.", 76, "     "), vec!["     Hey there, kid."]);
    }

    #[test]
    fn test_wraps_at_width() {
        let lines = wrap("aaa bbb ccc ddd", 12, "  ");
        assert_eq!(lines, vec!["  aaa bbb", "  ccc ddd"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
    }

    #[test]
    fn test_long_word_is_split() {
        assert_eq!(wrap("x abcdefgh", 6, " "), vec![" x", " abcde", " fgh"]);
    }

    #[test]
    fn test_blank_text() {
        assert!(wrap("  \n ", 76, "     ").is_empty());
    }

    #[test]
    fn test_subtitle_width() {
        let text = "I have been asked by the Lord of the Dead to see to it that you get \
                    to where you are going, which is, I gather, nowhere in particular.";
        for line in wrap(text, SUBTITLE_WIDTH, SUBTITLE_INDENT) {
            assert!(line.starts_with(SUBTITLE_INDENT));
            assert!(line.chars().count() <= SUBTITLE_WIDTH, "{line}");
        }
    }
}
