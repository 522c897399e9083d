//! Extractors whose rejections render as [`ErrorResponse`] bodies.
//!
//! [`ErrorResponse`]: crate::handler::response::ErrorResponse

mod enhanced_json;
mod enhanced_path;
mod validated_json;

pub use self::enhanced_json::Json;
pub use self::enhanced_path::Path;
pub use self::validated_json::ValidateJson;

/// Keeps the first lines of a rejection message and caps its length.
fn sanitize_error_message(message: &str, max_lines: usize, max_chars: usize) -> String {
    let lines = message.lines().take(max_lines).collect::<Vec<_>>();
    lines.join(" ").chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::sanitize_error_message;

    #[test]
    fn truncates_lines_and_length() {
        let message = "first\nsecond\nthird";
        assert_eq!(sanitize_error_message(message, 2, 100), "first second");
        assert_eq!(sanitize_error_message(message, 3, 8), "first se");
    }
}
