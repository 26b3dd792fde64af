//! Terminal rendering of model replies.
//!
//! Tutor replies use `$…$` for inline and `$$…$$` for display math. The math renderer
//! only colours those spans; every character of the reply is printed as received.

use colored::Colorize;

/// A slice of a reply. Math variants keep their `$` delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    InlineMath(&'a str),
    DisplayMath(&'a str),
}

impl<'a> Segment<'a> {
    /// The exact source text of this segment.
    pub fn raw(&self) -> &'a str {
        match self {
            Segment::Text(s) | Segment::InlineMath(s) | Segment::DisplayMath(s) => s,
        }
    }
}

/// Splits a reply into text and math segments.
///
/// `$$…$$` pairs are matched first, then `$…$` inside the remaining text. A delimiter
/// without a partner stays plain text. Joining the raw segments yields `text` again.
pub fn split_math(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("$$") {
        let Some(len) = rest[start + 2..].find("$$") else {
            break;
        };
        let end = start + 2 + len + 2;
        split_inline(&rest[..start], &mut out);
        out.push(Segment::DisplayMath(&rest[start..end]));
        rest = &rest[end..];
    }

    split_inline(rest, &mut out);
    out
}

fn split_inline<'a>(text: &'a str, out: &mut Vec<Segment<'a>>) {
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(open) = text[cursor..].find('$').map(|i| cursor + i) {
        let Some(close) = text[open + 1..].find('$').map(|i| open + 1 + i) else {
            break;
        };
        // "$$" with nothing inside is not a formula
        if close == open + 1 {
            cursor = close;
            continue;
        }
        if plain_start < open {
            out.push(Segment::Text(&text[plain_start..open]));
        }
        out.push(Segment::InlineMath(&text[open..=close]));
        plain_start = close + 1;
        cursor = plain_start;
    }

    if plain_start < text.len() {
        out.push(Segment::Text(&text[plain_start..]));
    }
}

/// How a reply is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    /// Reply printed untouched
    Plain,
    /// Math spans highlighted
    Math,
}

impl Renderer {
    pub fn render(&self, text: &str) -> String {
        match self {
            Renderer::Plain => text.to_string(),
            Renderer::Math => split_math(text)
                .into_iter()
                .map(|segment| {
                    let raw = segment.raw();
                    match segment {
                        Segment::Text(_) => raw.to_string(),
                        Segment::InlineMath(_) => raw.bright_yellow().to_string(),
                        Segment::DisplayMath(_) => raw.bright_cyan().bold().to_string(),
                    }
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(text: &str) -> String {
        split_math(text).iter().map(Segment::raw).collect()
    }

    #[test]
    fn splits_display_before_inline() {
        let text = "Roots: $$x = \\frac{-b \\pm \\sqrt{b^2-4ac}}{2a}$$ where $a \\ne 0$.";
        let segments = split_math(text);

        assert_eq!(
            segments,
            vec![
                Segment::Text("Roots: "),
                Segment::DisplayMath("$$x = \\frac{-b \\pm \\sqrt{b^2-4ac}}{2a}$$"),
                Segment::Text(" where "),
                Segment::InlineMath("$a \\ne 0$"),
                Segment::Text("."),
            ]
        );
    }

    #[test]
    fn display_math_may_span_lines() {
        let text = "الحل:\n$$\n\\int_0^1 x\\,dx = \\tfrac12\n$$\nانتهى";
        let segments = split_math(text);
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[1],
            Segment::DisplayMath("$$\n\\int_0^1 x\\,dx = \\tfrac12\n$$")
        );
    }

    #[test]
    fn unmatched_delimiters_stay_text() {
        assert_eq!(split_math("costs $5"), vec![Segment::Text("costs $5")]);
        assert_eq!(split_math("a $$ b"), vec![Segment::Text("a $$ b")]);
        assert!(split_math("").is_empty());
    }

    #[test]
    fn segments_reassemble_to_the_input() {
        for text in [
            "plain reply",
            "$a$$b$",
            "$$x$$ and $$y",
            "mixed $x$ then $$\ny\n$$ and a lone $",
            "```\ncode\n``` $$$",
        ] {
            assert_eq!(joined(text), text);
        }
    }

    #[test]
    fn renderers_keep_every_character() {
        colored::control::set_override(false);
        let text = "Use $E = mc^2$ and **bold** <b>html</b>";
        assert_eq!(Renderer::Plain.render(text), text);
        assert_eq!(Renderer::Math.render(text), text);
    }
}
