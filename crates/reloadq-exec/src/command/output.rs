use std::process::Output;

const TRUNCATED_MARK: &str = "...";

/// Captured tool output attached to a failure.
///
/// Prefers stderr (where nginx reports config errors), falls back to stdout.
pub(crate) fn diagnostics(output: &Output, max_len: usize) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = match stderr.trim() {
        "" => String::from_utf8_lossy(&output.stdout).trim().to_owned(),
        s => s.to_owned(),
    };
    truncate(text, max_len)
}

fn truncate(mut text: String, max_len: usize) -> String {
    if text.len() <= max_len {
        return text;
    }
    let mut cut = max_len;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str(TRUNCATED_MARK);
    text
}
