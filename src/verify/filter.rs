//! Regex filters applied to captured text before comparison.
//!
//! Patterns run in multi-line mode so `^`/`$` anchor at line boundaries.
//! Substitutions are written with Python-style backreferences (`\1`,
//! `\g<name>`) as found in existing descriptors; they are translated to
//! the `regex` crate's `${1}` syntax once, at load time.

use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct Filter {
    pattern: Regex,
    replacement: String,
}

impl Filter {
    pub fn new(pattern: &str, substitution: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).multi_line(true).build()?;
        Ok(Self {
            pattern,
            replacement: translate_substitution(substitution),
        })
    }

    /// Replace every non-overlapping match in `text`
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.replacement.as_str())
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Rewrite a Python `re.sub` template into `regex` replacement syntax
fn translate_substitution(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d @ '1'..='9') => {
                    chars.next();
                    let mut group = String::from(d);
                    if let Some(&next) = chars.peek() {
                        if next.is_ascii_digit() {
                            group.push(next);
                            chars.next();
                        }
                    }
                    out.push_str(&format!("${{{}}}", group));
                }
                Some('g') => {
                    chars.next();
                    if chars.peek() == Some(&'<') {
                        chars.next();
                        let name: String = chars.by_ref().take_while(|&ch| ch != '>').collect();
                        out.push_str(&format!("${{{}}}", name));
                    } else {
                        out.push_str("\\g");
                    }
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                _ => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out
}
