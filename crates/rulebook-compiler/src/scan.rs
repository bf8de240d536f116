//! Line-level markdown scanning
//!
//! Only what the validator needs: fenced code block tracking, ATX headings
//! and exact-match lines. Nothing here rewrites text.

use std::fmt;

/// Code fence marker style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FenceStyle {
    /// Three or more backticks
    Backtick,
    /// Three or more tildes
    Tilde,
}

impl FenceStyle {
    /// Marker prefix that opens or closes a fence of this style
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            FenceStyle::Backtick => "```",
            FenceStyle::Tilde => "~~~",
        }
    }

    fn of_line(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        if trimmed.starts_with(FenceStyle::Backtick.marker()) {
            Some(FenceStyle::Backtick)
        } else if trimmed.starts_with(FenceStyle::Tilde.marker()) {
            Some(FenceStyle::Tilde)
        } else {
            None
        }
    }
}

impl fmt::Display for FenceStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// What a line is, relative to code fences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Ordinary markdown outside any fence
    Text,
    /// Opens or closes a fence
    Fence(FenceStyle),
    /// Inside a fenced block
    Code,
}

/// Classify every line of `text`
///
/// A fence closes only on a marker of the style that opened it; a marker of
/// the other style inside a block is plain code.
pub fn classify_lines(text: &str) -> Vec<(LineKind, &str)> {
    let mut open: Option<FenceStyle> = None;
    text.lines()
        .map(|line| {
            let marker = FenceStyle::of_line(line);
            let kind = match (open, marker) {
                (None, Some(style)) => {
                    open = Some(style);
                    LineKind::Fence(style)
                }
                (Some(current), Some(style)) if current == style => {
                    open = None;
                    LineKind::Fence(style)
                }
                (Some(_), _) => LineKind::Code,
                (None, None) => LineKind::Text,
            };
            (kind, line)
        })
        .collect()
}

/// Lines outside fenced code blocks, fence lines excluded
pub fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    classify_lines(text)
        .into_iter()
        .filter(|(kind, _)| *kind == LineKind::Text)
        .map(|(_, line)| line)
}

/// Number of fence delimiters of `style`
pub fn fence_count(text: &str, style: FenceStyle) -> usize {
    classify_lines(text)
        .iter()
        .filter(|(kind, _)| *kind == LineKind::Fence(style))
        .count()
}

/// An ATX heading found outside code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading<'a> {
    /// Number of leading `#`
    pub level: usize,
    /// Heading text without the markers
    pub text: &'a str,
}

fn parse_heading(line: &str) -> Option<Heading<'_>> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some(Heading { level, text })
}

/// All headings outside fenced code, in order
pub fn headings(text: &str) -> Vec<Heading<'_>> {
    text_lines(text).filter_map(parse_heading).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const DOC: &str = "# Title\n\n```bash\n# not a heading\n~~~\n```\n\n## 1. Section\n\n~~~\n```\n~~~\n### Rule\n";

    #[test]
    fn test_headings_skip_code() {
        let found: Vec<_> = headings(DOC).into_iter().map(|h| (h.level, h.text)).collect();
        assert_eq!(found, vec![(1, "Title"), (2, "1. Section"), (3, "Rule")]);
    }

    #[test]
    fn test_other_style_inside_fence_is_code() {
        assert_eq!(fence_count(DOC, FenceStyle::Backtick), 2);
        assert_eq!(fence_count(DOC, FenceStyle::Tilde), 2);
    }

    #[test]
    fn test_unclosed_fence_is_odd() {
        let text = "```rust\nfn main() {}\n";
        assert_eq!(fence_count(text, FenceStyle::Backtick), 1);
    }

    #[test]
    fn test_heading_requires_space() {
        assert!(parse_heading("#hashtag").is_none());
        assert!(parse_heading("####### seven").is_none());
        assert!(parse_heading("#").is_none());
        assert_eq!(parse_heading("### Rule title ").unwrap().text, "Rule title");
    }

    #[test]
    fn test_text_lines_excludes_fences() {
        let lines: Vec<_> = text_lines("a\n```\nb\n```\nc").collect();
        assert_eq!(lines, vec!["a", "c"]);
    }
}
