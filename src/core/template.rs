/// Template compilation and rendering.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::io;
use std::ops::Range;

use crate::schema::responses::VariableKey;

/// A `{key}` placeholder located in a template's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub key: VariableKey,
    /// Byte range of the whole token, braces included.
    pub range: Range<usize>,
}

/// A compiled template: the original text plus its placeholder spans,
/// in ascending, non-overlapping order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
    spans: Vec<Span>,
}

impl Template {
    /// Compile a template string.
    ///
    /// A placeholder is `{` followed by one or more of `[a-zA-Z0-9_]`
    /// and a closing `}`. Anything else, stray braces included, is
    /// literal text. There is no escape syntax.
    pub fn compile(text: &str) -> Template {
        let bytes = text.as_bytes();
        let len = bytes.len();
        let mut spans = Vec::new();
        let mut i = 0;

        while i < len {
            if bytes[i] != b'{' {
                i += 1;
                continue;
            }

            let start = i + 1;
            let mut end = start;
            while end < len && is_key_byte(bytes[end]) {
                end += 1;
            }

            if end > start && end < len && bytes[end] == b'}' {
                spans.push(Span {
                    key: VariableKey(text[start..end].to_string()),
                    range: i..end + 1,
                });
                i = end + 1;
            } else {
                // Not a placeholder; a later `{` may still open one.
                i += 1;
            }
        }

        Template {
            text: text.to_string(),
            spans,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Variable keys referenced by this template, in order of appearance.
    pub fn keys(&self) -> impl Iterator<Item = &VariableKey> {
        self.spans.iter().map(|span| &span.key)
    }

    /// Render into a new string. Keys missing from `vars` render empty.
    pub fn render<S: BuildHasher>(&self, vars: &HashMap<&str, &str, S>) -> String {
        let mut out = String::with_capacity(self.text.len());
        for piece in self.pieces(vars) {
            out.push_str(piece);
        }
        out
    }

    /// Render piece by piece into `w`, stopping at the first write error.
    pub fn render_to<W, S>(&self, w: &mut W, vars: &HashMap<&str, &str, S>) -> io::Result<()>
    where
        W: io::Write + ?Sized,
        S: BuildHasher,
    {
        for piece in self.pieces(vars) {
            w.write_all(piece.as_bytes())?;
        }
        Ok(())
    }

    /// Literal text and substituted values, alternating, in output order.
    fn pieces<'a, S: BuildHasher>(
        &'a self,
        vars: &'a HashMap<&'a str, &'a str, S>,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let tail = self.spans.last().map_or(0, |span| span.range.end);
        let mut last = 0;
        self.spans
            .iter()
            .flat_map(move |span| {
                let literal = &self.text[last..span.range.start];
                last = span.range.end;
                let value = vars.get(span.key.as_str()).copied().unwrap_or("");
                [literal, value]
            })
            .chain(std::iter::once(&self.text[tail..]))
    }
}

fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
