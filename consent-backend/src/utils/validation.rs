// src/utils/validation.rs

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// DTO間で共有するバリデーション定数と関数
pub mod common {
    use super::*;

    pub mod consent {
        pub const RECIPIENT_NAME_MIN_LENGTH: u64 = 1;
        pub const RECIPIENT_NAME_MAX_LENGTH: u64 = 100;
        pub const PURPOSE_MIN_LENGTH: u64 = 1;
        pub const PURPOSE_MAX_LENGTH: u64 = 500;
    }

    // 制御文字を含む名前を拒否する
    static CONTROL_CHARS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[\x00-\x1f\x7f]").expect("invalid control char regex"));

    pub fn validate_recipient_name(name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            let mut error = ValidationError::new("recipient_name_blank");
            error.message = Some("Recipient name must not be blank".into());
            return Err(error);
        }
        if CONTROL_CHARS.is_match(name) {
            let mut error = ValidationError::new("recipient_name_control_chars");
            error.message = Some("Recipient name must not contain control characters".into());
            return Err(error);
        }
        Ok(())
    }

    pub fn validate_purpose(purpose: &str) -> Result<(), ValidationError> {
        if purpose.trim().is_empty() {
            let mut error = ValidationError::new("purpose_blank");
            error.message = Some("Purpose must not be blank".into());
            return Err(error);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::common::*;

    #[test]
    fn blank_recipient_name_is_rejected() {
        assert!(validate_recipient_name("   ").is_err());
        assert!(validate_recipient_name("Dr. Tanaka").is_ok());
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(validate_recipient_name("Dr.\x00Tanaka").is_err());
        assert!(validate_recipient_name("Dr.\nTanaka").is_err());
    }

    #[test]
    fn blank_purpose_is_rejected() {
        assert!(validate_purpose("").is_err());
        assert!(validate_purpose("Annual checkup review").is_ok());
    }
}
