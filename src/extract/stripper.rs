//! Markup stripper
//!
//! A single left-to-right scan that turns fetched markup into plain text.
//! It is deliberately not an HTML parser: tags are skipped linearly and only
//! the bodies of `<script>` and `<style>` elements are suppressed.
//!
//! Known limitations:
//! - a `>` inside a quoted attribute value ends the tag early
//! - comments (`<!-- -->`) are treated like any other tag
//! - a bare `<` in text suppresses everything up to the next `>`
//! - a `>` is never copied to the output, even outside a tag
//! - element markers are matched case-sensitively (`<SCRIPT>` is an ordinary tag)

/// Elements whose bodies are suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Body {
    Script,
    Style,
}

impl Body {
    const ALL: [Body; 2] = [Body::Script, Body::Style];

    fn open_marker(self) -> &'static str {
        match self {
            Body::Script => "<script",
            Body::Style => "<style",
        }
    }

    fn close_marker(self) -> &'static str {
        match self {
            Body::Script => "</script>",
            Body::Style => "</style>",
        }
    }

    fn opened_at(rest: &str) -> Option<Body> {
        Self::ALL.into_iter().find(|b| rest.starts_with(b.open_marker()))
    }
}

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    /// Inside `<...>`; `resume` is the state entered on the closing `>`
    InTag { resume: Resume },
    InBody(Body),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    Text,
    Body(Body),
}

/// Plain text extracted from markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stripped {
    pub text: String,

    /// Set when the output hit capacity before the input was exhausted
    pub truncated: bool,
}

/// Strips markup from `raw`, keeping at most `capacity` bytes of text
///
/// # Example
///
/// ```
/// use sumi_harvest::extract::strip;
///
/// let out = strip("<script>alert(1)</script><p>Hello <b>World</b></p>", 100);
/// assert_eq!(out.text, "Hello World");
/// assert!(!out.truncated);
/// ```
pub fn strip(raw: &str, capacity: usize) -> Stripped {
    let mut out = Stripped {
        text: String::with_capacity(capacity.min(raw.len())),
        truncated: false,
    };
    let mut state = State::Text;

    for (i, c) in raw.char_indices() {
        let rest = &raw[i..];
        state = match state {
            State::Text if c == '<' => State::InTag {
                resume: match Body::opened_at(rest) {
                    Some(body) => Resume::Body(body),
                    None => Resume::Text,
                },
            },
            State::Text if c == '>' => State::Text,
            State::Text => {
                if out.text.len() + c.len_utf8() > capacity {
                    out.truncated = true;
                    break;
                }
                out.text.push(c);
                State::Text
            }
            State::InTag { resume } if c == '<' => State::InTag {
                resume: Body::opened_at(rest).map_or(resume, Resume::Body),
            },
            State::InTag { resume } if c == '>' => match resume {
                Resume::Text => State::Text,
                Resume::Body(body) => State::InBody(body),
            },
            State::InTag { .. } => state,
            State::InBody(body) if c == '<' && rest.starts_with(body.close_marker()) => {
                State::InTag {
                    resume: Resume::Text,
                }
            }
            State::InBody(_) => state,
        };
    }

    out
}
