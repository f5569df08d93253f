//! Line-oriented unified diff.
//!
//! Produces the same shape as a classic `diff -u`: `---`/`+++` headers,
//! `@@ -a,b +c,d @@` hunk headers and three lines of context.

use similar::{ChangeTag, TextDiff};

const CONTEXT: usize = 3;

/// Unified diff of two line sequences; empty when they are equal.
pub fn unified_diff(a: &[&str], b: &[&str], from_name: &str, to_name: &str) -> Vec<String> {
    let diff = TextDiff::from_slices(a, b);
    let mut unified = diff.unified_diff();
    unified.context_radius(CONTEXT);

    let mut lines = Vec::new();
    for hunk in unified.iter_hunks() {
        if lines.is_empty() {
            lines.push(format!("--- {}", from_name));
            lines.push(format!("+++ {}", to_name));
        }
        lines.push(hunk.header().to_string());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Equal => ' ',
                ChangeTag::Delete => '-',
                ChangeTag::Insert => '+',
            };
            lines.push(format!("{}{}", sign, change.value()));
        }
    }
    lines
}
