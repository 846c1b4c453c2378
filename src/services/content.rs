//! Post and comment body processing.
//!
//! Bodies are stored as text with `@mention` spans injected; markdown
//! rendering and HTML sanitization happen in the rendering layer.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

lazy_static! {
    static ref MENTION_RE: Regex = Regex::new(r"@(\w+)").unwrap();

    /// Handle alphabet; keeps usernames addressable by the mention syntax.
    static ref USERNAME_RE: Regex = Regex::new(r"^\w+$").unwrap();
}

/// Usernames must stay within the mention alphabet or `@name` references
/// to them stop resolving.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Username may only contain letters, digits and underscores".into(),
        ))
    }
}

/// Wrap every `@username` in a styled mention span.
pub fn parse_mentions(text: &str) -> String {
    MENTION_RE
        .replace_all(text, r#"<span class="mention">@$1</span>"#)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_mentions() {
        assert_eq!(
            parse_mentions("hey @tessia!"),
            r#"hey <span class="mention">@tessia</span>!"#
        );
    }

    #[test]
    fn handles_multiple_mentions() {
        let out = parse_mentions("@a and @b");
        assert_eq!(out.matches("class=\"mention\"").count(), 2);
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(parse_mentions("no mentions here"), "no mentions here");
        assert_eq!(parse_mentions("mail@ domain"), "mail@ domain");
    }

    #[test]
    fn username_alphabet() {
        assert!(validate_username("tessia_2000").is_ok());
        assert!(validate_username("star girl").is_err());
        assert!(validate_username("a-b").is_err());
        assert!(validate_username("").is_err());
    }
}
