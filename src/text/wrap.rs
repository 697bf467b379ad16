//! Greedy word wrapping against a pixel width budget.
//!
//! Both variants insert additional `\n` breaks into the text; source
//! newlines are preserved as hard breaks and each source line is wrapped
//! independently.

/// Greedy per-line wrap.
///
/// Words are accumulated against the remaining budget; a break is emitted
/// before a word only when the word plus its separating space would
/// overflow *and* the current output line already holds at least one word.
/// The first word of a line is never broken before, even when it alone
/// exceeds the budget. Consecutive spaces collapse to a single space as a
/// structural property of the split/join.
pub fn basic_wrap(text: &str, budget: f32, measure: &mut dyn FnMut(&str) -> f32) -> String {
    let space_width = measure(" ");
    let mut out = String::with_capacity(text.len());

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let mut remaining = budget;
        let mut first = true;
        for word in line.split(' ').filter(|word| !word.is_empty()) {
            let word_width = measure(word);
            if !first && word_width + space_width > remaining {
                out.push('\n');
                remaining = budget - word_width;
            } else {
                if !first {
                    out.push(' ');
                    remaining -= space_width;
                }
                remaining -= word_width;
            }
            out.push_str(word);
            first = false;
        }
    }

    out
}

/// Whitespace-collapsing wrap that also hard-splits words wider than the
/// budget, character by character.
pub fn advanced_wrap(text: &str, budget: f32, measure: &mut dyn FnMut(&str) -> f32) -> String {
    let space_width = measure(" ");
    let mut out = String::with_capacity(text.len());

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let mut remaining = budget;
        let mut line_empty = true;
        for word in line.split_whitespace() {
            let word_width = measure(word);

            if word_width > budget {
                // flush the current line, then emit budget-sized chunks
                if !line_empty {
                    out.push('\n');
                }
                remaining = budget;
                let mut chunk = String::new();
                for ch in word.chars() {
                    chunk.push(ch);
                    if measure(&chunk) > budget && chunk.chars().count() > 1 {
                        chunk.pop();
                        out.push_str(&chunk);
                        out.push('\n');
                        chunk.clear();
                        chunk.push(ch);
                    }
                }
                remaining -= measure(&chunk);
                out.push_str(&chunk);
                line_empty = false;
                continue;
            }

            if !line_empty && word_width + space_width > remaining {
                out.push('\n');
                remaining = budget - word_width;
            } else {
                if !line_empty {
                    out.push(' ');
                    remaining -= space_width;
                }
                remaining -= word_width;
            }
            out.push_str(word);
            line_empty = false;
        }
    }

    out
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// 10px per character, like the mock surface.
    fn measure(text: &str) -> f32 {
        text.chars().count() as f32 * 10.0
    }

    fn widest_line(text: &str) -> f32 {
        text.split('\n').map(measure).fold(0.0, f32::max)
    }

    #[test]
    fn breaks_lines_at_the_budget() {
        let wrapped = basic_wrap("the quick brown fox jumps", 100.0, &mut measure);
        assert_eq!(wrapped, "the quick\nbrown fox\njumps");
        assert!(widest_line(&wrapped) <= 100.0);
    }

    #[test]
    fn words_are_preserved_exactly_and_in_order() {
        let text = "one two three four five six seven";
        let wrapped = basic_wrap(text, 70.0, &mut measure);
        let original: Vec<&str> = text.split_whitespace().collect();
        let rewrapped: Vec<&str> = wrapped.split_whitespace().collect();
        assert_eq!(original, rewrapped);
    }

    #[test]
    fn first_word_never_breaks_even_over_budget() {
        let wrapped = basic_wrap("extraordinarily big", 50.0, &mut measure);
        assert_eq!(wrapped, "extraordinarily\nbig");
    }

    #[test]
    fn source_newlines_are_hard_breaks() {
        let wrapped = basic_wrap("aa bb\ncc dd", 200.0, &mut measure);
        assert_eq!(wrapped, "aa bb\ncc dd");
    }

    #[test]
    fn consecutive_spaces_collapse() {
        let wrapped = basic_wrap("aa    bb", 200.0, &mut measure);
        assert_eq!(wrapped, "aa bb");
    }

    #[test]
    fn advanced_wrap_splits_oversized_words() {
        let wrapped = advanced_wrap("abcdefghijkl on", 50.0, &mut measure);
        assert_eq!(wrapped, "abcde\nfghij\nkl on");
        assert!(widest_line(&wrapped) <= 50.0);
    }

    #[test]
    fn advanced_wrap_collapses_whitespace() {
        let wrapped = advanced_wrap("  aa \t bb  ", 200.0, &mut measure);
        assert_eq!(wrapped, "aa bb");
    }
}
