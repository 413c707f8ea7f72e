//! Phone number normalization.
//!
//! The phone number is the login key. Clients send it in whatever format
//! the device address book produced ("010-1234-5678", "+82 10 1234 5678"),
//! so every comparison and every stored value goes through
//! [`normalize_phone`] first.

/// Strip every non-digit character from a phone number.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_separators() {
        assert_eq!(normalize_phone("010-1234-5678"), "01012345678");
        assert_eq!(normalize_phone("010 1234 5678"), "01012345678");
        assert_eq!(normalize_phone("(010) 1234.5678"), "01012345678");
    }

    #[test]
    fn test_strips_country_prefix_punctuation() {
        assert_eq!(normalize_phone("+82-10-1234-5678"), "821012345678");
    }

    #[test]
    fn test_digits_pass_through() {
        assert_eq!(normalize_phone("01012345678"), "01012345678");
    }

    #[test]
    fn test_empty_and_garbage() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("abc"), "");
    }
}
