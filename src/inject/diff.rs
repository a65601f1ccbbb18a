use core::fmt::Write as _;

const CONTEXT_LINES: usize = 3;

/// Produce a minimal unified diff between two documents, or an empty string
/// when they are identical.
///
/// This is intentionally simple: one hunk covering the changed region
/// (computed from the common line prefix and suffix) with up to three lines
/// of context on each side. That is all check mode needs to show a CI log
/// why a document is out of date, and the output is deterministic.
#[must_use]
pub fn unified_diff(old: &str, new: &str, old_label: &str, new_label: &str) -> String {
    if old == new {
        return String::new();
    }

    // split('\n') rather than lines(): the trailing empty element encodes
    // trailing-newline presence, so that drift shows up in the diff too.
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();

    let common = old_lines.len().min(new_lines.len());
    let mut prefix = 0;
    while prefix < common && old_lines[prefix] == new_lines[prefix] {
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < common - prefix
        && old_lines[old_lines.len() - 1 - suffix] == new_lines[new_lines.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let context_start = prefix.saturating_sub(CONTEXT_LINES);
    let old_changed_end = old_lines.len() - suffix;
    let new_changed_end = new_lines.len() - suffix;
    let context_end = (old_changed_end + CONTEXT_LINES).min(old_lines.len());

    let old_count = context_end - context_start;
    let new_count = old_count - (old_changed_end - prefix) + (new_changed_end - prefix);

    let mut out = String::new();
    let _ = writeln!(out, "--- {old_label}");
    let _ = writeln!(out, "+++ {new_label}");
    let _ = writeln!(out, "@@ -{},{old_count} +{},{new_count} @@", context_start + 1, context_start + 1);

    for line in &old_lines[context_start..prefix] {
        let _ = writeln!(out, " {line}");
    }
    for line in &old_lines[prefix..old_changed_end] {
        let _ = writeln!(out, "-{line}");
    }
    for line in &new_lines[prefix..new_changed_end] {
        let _ = writeln!(out, "+{line}");
    }
    for line in &old_lines[old_changed_end..context_end] {
        let _ = writeln!(out, " {line}");
    }

    out
}
