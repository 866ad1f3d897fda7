//! Half-star ratings.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A diary rating between half a star and five stars, in half steps.
///
/// Construction validates the domain, so the star display can never be
/// malformed.
///
/// # Example
///
/// ```rust
/// use reelsync::models::Rating;
///
/// let rating = Rating::new(3.5)?;
/// assert_eq!(rating.stars(), "★★★½");
/// assert!(Rating::new(3.7).is_err());
/// # Ok::<(), reelsync::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    /// Lowest rating a diary entry can carry.
    pub const MIN: f64 = 0.5;
    /// Highest rating a diary entry can carry.
    pub const MAX: f64 = 5.0;

    /// Creates a rating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRating`] if the value is not a finite half step
    /// within `0.5..=5.0`.
    pub fn new(value: f64) -> Result<Self> {
        let on_half_step = (value * 2.0).fract() == 0.0;
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) && on_half_step {
            Ok(Self(value))
        } else {
            Err(Error::InvalidRating(value))
        }
    }

    /// Parses a rating from text such as `"4.5"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a number or not a valid rating.
    pub fn parse(text: &str) -> Result<Self> {
        let value: f64 = text
            .trim()
            .parse()
            .map_err(|_| Error::InvalidInput(format!("rating '{text}' is not a number")))?;
        Self::new(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Renders the rating as full stars plus an optional half star.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn stars(self) -> String {
        let halves = (self.0 * 2.0).round() as usize;
        let mut stars = "★".repeat(halves / 2);
        if halves % 2 == 1 {
            stars.push('½');
        }
        stars
    }
}

impl TryFrom<f64> for Rating {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.5, "½" ; "half")]
    #[test_case(1.0, "★" ; "one")]
    #[test_case(2.5, "★★½" ; "two and a half")]
    #[test_case(4.5, "★★★★½" ; "four and a half")]
    #[test_case(5.0, "★★★★★" ; "five")]
    fn test_stars(value: f64, expected: &str) {
        let rating = Rating::new(value).unwrap();
        assert_eq!(rating.stars(), expected);
    }

    #[test_case(0.0 ; "zero")]
    #[test_case(5.5 ; "above five")]
    #[test_case(-1.0 ; "negative")]
    #[test_case(3.3 ; "not a half step")]
    #[test_case(f64::NAN ; "nan")]
    #[test_case(f64::INFINITY ; "infinity")]
    fn test_out_of_domain_is_rejected(value: f64) {
        assert!(matches!(Rating::new(value), Err(Error::InvalidRating(_))));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Rating::parse(" 4.5 ").unwrap().value(), 4.5);
        assert!(matches!(Rating::parse("four"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Rating = serde_json::from_str("3.5").unwrap();
        assert_eq!(ok.value(), 3.5);
        assert!(serde_json::from_str::<Rating>("7").is_err());
    }
}
