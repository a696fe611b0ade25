//! Input validation for the save path and extra downloader parameters.
//!
//! Both checks are pure predicates over the raw strings; the request builder
//! turns a failed check into a [`ValidationRejection`] and aborts the build.

use once_cell::sync::Lazy;
use regex::Regex;

/// Why a request was refused. The `Display` text is meant for the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationRejection {
    #[error("Invalid path. Path contains invalid characters.")]
    InvalidPath,
    #[error("Invalid custom parameters. Dangerous characters detected.")]
    UnsafeCustomParams,
}

/// Characters that may not appear in a save path besides control characters.
const FORBIDDEN_PATH_CHARS: &[char] = &['<', '>', '"', '|', '?', '*'];

/// Redirection, pipes, command chaining and command substitution.
static UNSAFE_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[<>|]|&&|\|\||`|\$\(|;\s*[a-z]").unwrap());

/// True if `path` is usable as a save directory.
///
/// Rejects empty strings, control characters (0x00-0x1F) and `< > " | ? *`.
/// Everything else passes, including `:` for drive letters and spaces.
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && !path
            .chars()
            .any(|c| ('\u{0}'..='\u{1f}').contains(&c) || FORBIDDEN_PATH_CHARS.contains(&c))
}

/// True if `params` is safe to hand to the downloader. Empty is valid.
pub fn is_safe_custom_params(params: &str) -> bool {
    if params.is_empty() {
        return true;
    }
    !UNSAFE_PARAMS.is_match(params)
}

pub fn check_path(path: &str) -> Result<(), ValidationRejection> {
    if is_valid_path(path) {
        Ok(())
    } else {
        Err(ValidationRejection::InvalidPath)
    }
}

pub fn check_custom_params(params: &str) -> Result<(), ValidationRejection> {
    if is_safe_custom_params(params) {
        Ok(())
    } else {
        Err(ValidationRejection::UnsafeCustomParams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_accepts_drive_letters_and_spaces() {
        assert!(is_valid_path("C:\\Downloads\\"));
        assert!(is_valid_path("D:\\My Music\\Rips!"));
        assert!(is_valid_path("/home/user/Music"));
        assert!(is_valid_path(" "));
    }

    #[test]
    fn path_rejects_forbidden_characters() {
        for bad in ["", "a<b", "a>b", "a\"b", "a|b", "what?", "*.mp3", "tab\there", "nul\0", "\u{1f}"] {
            assert!(!is_valid_path(bad), "{bad:?} should be rejected");
        }
        assert!(is_valid_path("del\u{7f}"));
    }

    #[test]
    fn custom_params_accepts_plain_flags() {
        assert!(is_safe_custom_params(""));
        assert!(is_safe_custom_params("--flat-playlist"));
        assert!(is_safe_custom_params("--extract-flat --flat-playlist"));
        assert!(is_safe_custom_params("--sleep-interval 5;"));
        assert!(is_safe_custom_params("-o a;1"));
    }

    #[test]
    fn custom_params_rejects_shell_syntax() {
        for bad in ["a && rm -rf /", "`whoami`", "$(id)", "a; ls", "a;LS", "x > out", "x | tee", "a || b", "< in"] {
            assert!(!is_safe_custom_params(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn rejection_messages_are_user_facing() {
        assert_eq!(
            check_path("a|b").unwrap_err().to_string(),
            "Invalid path. Path contains invalid characters."
        );
        assert_eq!(
            check_custom_params("$(id)").unwrap_err().to_string(),
            "Invalid custom parameters. Dangerous characters detected."
        );
    }
}
