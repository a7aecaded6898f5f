//! Coarse destination-country buckets
//!
//! Countries are matched by case-insensitive substring against the English
//! and Korean spellings. Anything else is `Other`, for which no script rule
//! applies.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountryBucket {
    China,
    Vietnam,
    Other,
}

impl CountryBucket {
    pub fn from_country(country: &str) -> Self {
        let c = country.to_lowercase();
        if c.contains("china") || c.contains("중국") {
            Self::China
        } else if c.contains("vietnam") || c.contains("베트남") {
            Self::Vietnam
        } else {
            Self::Other
        }
    }

    /// Language expected in the parenthesized half of each keyword
    pub fn local_language(self) -> &'static str {
        match self {
            Self::China => "Simplified Chinese",
            Self::Vietnam => "Vietnamese",
            Self::Other => "Local language",
        }
    }
}

/// Label of the local language expected for `country`
pub fn expected_local_language(country: &str) -> &'static str {
    CountryBucket::from_country(country).local_language()
}
