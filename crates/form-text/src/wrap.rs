//! Greedy word wrapping
//!
//! Words are packed onto a line for as long as the measured line still fits
//! the available width. Measurement is delegated to the caller, so the same
//! routine serves embedded TrueType fonts and the standard PDF fonts.

/// Wrap `text` into lines no wider than `max_width`
///
/// * Embedded newlines always start a new line; blank input lines are kept.
/// * A single word wider than `max_width` is placed alone on its own line
///   rather than split.
/// * Empty or missing text yields exactly one empty line.
///
/// # Arguments
/// * `text` - Text to wrap, `None` for a missing value
/// * `max_width` - Available width in points
/// * `width_of` - Width in points of a candidate line
pub fn wrap_text<F>(text: Option<&str>, max_width: f64, width_of: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let text = text.unwrap_or_default();
    if text.trim().is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        wrap_paragraph(paragraph, max_width, &width_of, &mut lines);
    }
    lines
}

fn wrap_paragraph<F>(paragraph: &str, max_width: f64, width_of: &F, lines: &mut Vec<String>)
where
    F: Fn(&str) -> f64,
{
    let mut current = String::new();

    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        if width_of(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    lines.push(current);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Monospace measure: every char is `w` points wide
    fn mono(w: f64) -> impl Fn(&str) -> f64 {
        move |s: &str| s.chars().count() as f64 * w
    }

    #[test]
    fn test_wraps_at_width() {
        let lines = wrap_text(Some("Hello world this is a test"), 55.0, mono(5.0));
        assert_eq!(lines, vec!["Hello world", "this is a", "test"]);
    }

    #[test]
    fn test_single_line_when_it_fits() {
        assert_eq!(wrap_text(Some("Short"), 500.0, mono(5.0)), vec!["Short"]);
    }

    #[test]
    fn test_never_exceeds_width_except_lone_long_word() {
        let text = "a bb ccc dddd eeeee ffffffffffffffffffff gg hhh";
        let max_width = 40.0;
        let measure = mono(4.0);
        for line in wrap_text(Some(text), max_width, &measure) {
            assert!(
                measure(&line) <= max_width || !line.contains(' '),
                "line {line:?} is too wide"
            );
        }
    }

    #[test]
    fn test_long_word_stands_alone() {
        let lines = wrap_text(Some("to Supercalifragilistic now"), 30.0, mono(3.0));
        assert_eq!(lines, vec!["to", "Supercalifragilistic", "now"]);
    }

    #[test]
    fn test_newlines_force_breaks() {
        let lines = wrap_text(Some("first line\n\nthird"), 500.0, mono(5.0));
        assert_eq!(lines, vec!["first line", "", "third"]);
    }

    #[test]
    fn test_collapses_runs_of_spaces() {
        let lines = wrap_text(Some("  spaced    out  "), 500.0, mono(5.0));
        assert_eq!(lines, vec!["spaced out"]);
    }

    #[test]
    fn test_empty_and_missing_yield_one_blank_line() {
        assert_eq!(wrap_text(Some(""), 100.0, mono(5.0)), vec![""]);
        assert_eq!(wrap_text(Some("   "), 100.0, mono(5.0)), vec![""]);
        assert_eq!(wrap_text(None, 100.0, mono(5.0)), vec![""]);
    }

    #[test]
    fn test_proportional_measure() {
        // 'i' is narrow, 'W' is wide
        let measure = |s: &str| {
            s.chars()
                .map(|c| match c {
                    'i' => 2.0,
                    'W' => 9.0,
                    _ => 5.0,
                })
                .sum::<f64>()
        };
        let lines = wrap_text(Some("iiii iiii WWW WWW"), 30.0, measure);
        assert_eq!(lines, vec!["iiii iiii", "WWW", "WWW"]);
    }
}
