const PREVIEW_CHARS: usize = 32;

/// A bounded, char-boundary-safe preview of `input` for error messages.
pub(crate) fn preview(input: &str) -> String {
    match input.char_indices().nth(PREVIEW_CHARS) {
        Some((at, _)) => format!("{}...", &input[..at]),
        None => input.to_string(),
    }
}
