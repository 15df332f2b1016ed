use std::fmt;

use serde::{Deserialize, Serialize};

const BOM: char = '\u{feff}';

/// A raw phone number as supplied by the caller. Only emptiness is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneQuery(String);

impl PhoneQuery {
    pub fn parse(s: String) -> Result<PhoneQuery, String> {
        let trimmed = s.trim();
        match trimmed.is_empty() {
            true => Err("Phone number cannot be empty".to_string()),
            false => Ok(PhoneQuery(trimmed.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneQuery {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PhoneQuery::parse(value)
    }
}

impl From<PhoneQuery> for String {
    fn from(value: PhoneQuery) -> Self {
        value.0
    }
}

impl AsRef<str> for PhoneQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits line-delimited upload content into phone queries, skipping blank lines.
pub fn parse_phone_numbers(content: &str) -> Vec<PhoneQuery> {
    content
        .trim_start_matches(BOM)
        .lines()
        .filter_map(|line| PhoneQuery::parse(line.to_string()).ok())
        .collect()
}
