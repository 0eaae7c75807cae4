//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a join code is exactly 4 ASCII letters.
///
/// Case is accepted here; the lobby service uppercases the code before the
/// repository lookup.
pub fn validate_join_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 4 {
        let mut err = ValidationError::new("join_code_length");
        err.message =
            Some(format!("Join code must be exactly 4 characters (got {})", code.len()).into());
        return Err(err);
    }

    if !code.chars().all(|c| c.is_ascii_alphabetic()) {
        let mut err = ValidationError::new("join_code_format");
        err.message = Some("Join code must contain only letters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_join_code_valid() {
        assert!(validate_join_code("ABCD").is_ok());
        assert!(validate_join_code("wxyz").is_ok());
        assert!(validate_join_code("QqRr").is_ok());
    }

    #[test]
    fn test_validate_join_code_invalid_length() {
        assert!(validate_join_code("ABC").is_err()); // too short
        assert!(validate_join_code("ABCDE").is_err()); // too long
        assert!(validate_join_code("").is_err()); // empty
    }

    #[test]
    fn test_validate_join_code_invalid_format() {
        assert!(validate_join_code("AB1D").is_err()); // digit
        assert!(validate_join_code("AB D").is_err()); // space
        assert!(validate_join_code("AB-D").is_err()); // punctuation
    }
}
