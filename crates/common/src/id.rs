//! ID generation utilities.

use rand::RngCore;
use ulid::Ulid;
use uuid::Uuid;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a new random UUID v4.
    #[must_use]
    pub fn generate_uuid_v4(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Generate an opaque refresh token: 32 random bytes, hex encoded.
    ///
    /// The result is always 64 lowercase hexadecimal characters, which is
    /// the exact shape the credential layer accepts before any lookup.
    #[must_use]
    pub fn generate_refresh_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_refresh_token_shape() {
        let id_gen = IdGenerator::new();
        let token = id_gen.generate_refresh_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token, token.to_lowercase());
    }
}
