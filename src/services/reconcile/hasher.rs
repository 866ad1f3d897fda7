//! Synthetic identifiers for records without an upstream id.
//!
//! Diary CSV exports carry no viewing id, so each row gets a deterministic
//! one derived from what identifies a viewing: title, year, watched date and
//! the rewatch flag. Re-importing the same export yields the same ids.

use sha2::{Digest, Sha256};

/// Prefix of every synthetic identifier.
pub const SYNTHETIC_PREFIX: &str = "csv-";

/// Number of hex characters kept from the digest.
const ID_HEX_LEN: usize = 16;

/// Builds synthetic record identifiers.
///
/// # Example
///
/// ```rust
/// use reelsync::services::reconcile::IdentifierHasher;
///
/// let a = IdentifierHasher::diary_id("Heat", Some(1995), Some("2024-03-01"), false);
/// let b = IdentifierHasher::diary_id("  heat ", Some(1995), Some("2024-03-01"), false);
/// assert_eq!(a, b);
/// assert!(a.starts_with("csv-"));
/// assert_eq!(a.len(), "csv-".len() + 16);
/// ```
pub struct IdentifierHasher;

impl IdentifierHasher {
    /// Computes the identifier of one diary viewing.
    #[must_use]
    pub fn diary_id(
        title: &str,
        year: Option<i32>,
        watched_date: Option<&str>,
        rewatch: bool,
    ) -> String {
        let key = format!(
            "{}|{}|{}|{}",
            Self::normalize(title),
            year.map(|y| y.to_string()).unwrap_or_default(),
            watched_date.unwrap_or_default().trim(),
            rewatch
        );
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("{SYNTHETIC_PREFIX}{}", &digest[..ID_HEX_LEN])
    }

    /// Normalizes text for hashing.
    ///
    /// - Trims leading/trailing whitespace
    /// - Converts to lowercase
    /// - Collapses whitespace runs to single spaces
    #[must_use]
    pub fn normalize(content: &str) -> String {
        content
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = IdentifierHasher::diary_id("Heat", Some(1995), Some("2024-03-01"), false);
        let b = IdentifierHasher::diary_id("Heat", Some(1995), Some("2024-03-01"), false);
        assert_eq!(a, b);
        assert_eq!(a.len(), SYNTHETIC_PREFIX.len() + ID_HEX_LEN);
        assert!(a.starts_with(SYNTHETIC_PREFIX));
    }

    #[test]
    fn test_each_part_matters() {
        let base = IdentifierHasher::diary_id("Heat", Some(1995), Some("2024-03-01"), false);
        assert_ne!(base, IdentifierHasher::diary_id("Heat", Some(1995), Some("2024-03-01"), true));
        assert_ne!(base, IdentifierHasher::diary_id("Heat", Some(1995), Some("2024-03-02"), false));
        assert_ne!(base, IdentifierHasher::diary_id("Heat", Some(1986), Some("2024-03-01"), false));
        assert_ne!(base, IdentifierHasher::diary_id("Heathers", Some(1995), Some("2024-03-01"), false));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(IdentifierHasher::normalize("  The   Thing "), "the thing");
    }
}
