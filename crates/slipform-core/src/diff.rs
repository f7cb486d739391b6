//! Unified diff generation utilities.
//!
//! Produces a single-hunk, full-context unified diff between an original and a
//! rewritten text. Used by the debug surface to show what translation changed.

use difference::{Changeset, Difference};

use crate::text::line_count;

/// Generate a unified diff between two texts.
///
/// The diff always contains exactly one hunk spanning both files, so every
/// unchanged line appears as context.
pub fn generate_unified_diff(label: &str, original: &str, rewritten: &str) -> String {
    let mut diff = String::new();
    diff.push_str(&format!("--- a/{}\n", label));
    diff.push_str(&format!("+++ b/{}\n", label));
    diff.push_str(&format!(
        "@@ -1,{} +1,{} @@\n",
        line_count(original),
        line_count(rewritten)
    ));

    let changeset = Changeset::new(
        original.trim_end_matches('\n'),
        rewritten.trim_end_matches('\n'),
        "\n",
    );
    for change in &changeset.diffs {
        let (marker, chunk) = match change {
            Difference::Same(text) => (' ', text),
            Difference::Rem(text) => ('-', text),
            Difference::Add(text) => ('+', text),
        };
        for line in chunk.split('\n') {
            diff.push(marker);
            diff.push_str(line);
            diff.push('\n');
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_marks_added_lines() {
        let original = "def f():\n    a = 5\n";
        let rewritten = "def f():\n    a = graph.constant(5)\n    a.set_name('a')\n";

        let diff = generate_unified_diff("f.py", original, rewritten);

        assert!(diff.starts_with("--- a/f.py\n+++ b/f.py\n@@ -1,2 +1,3 @@\n"));
        assert!(diff.contains(" def f():\n"));
        assert!(diff.contains("-    a = 5\n"));
        assert!(diff.contains("+    a = graph.constant(5)\n"));
        assert!(diff.contains("+    a.set_name('a')\n"));
    }

    #[test]
    fn identical_texts_are_all_context() {
        let text = "x\ny\n";
        let diff = generate_unified_diff("same.py", text, text);
        let body: Vec<&str> = diff.lines().skip(3).collect();
        assert_eq!(body, vec![" x", " y"]);
        assert!(diff.contains("@@ -1,2 +1,2 @@\n"));
    }
}
