use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Lookup key for a race.
///
/// The race treats the key as opaque; only surrounding whitespace is
/// stripped so the same code typed with a trailing newline hits the same URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyPostalCode);
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PostalCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for PostalCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for PostalCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PostalCode> for String {
    fn from(value: PostalCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let parsed = PostalCode::parse(" 01153000\n").expect("postal code should parse");
        assert_eq!(parsed.as_str(), "01153000");
    }

    #[test]
    fn keeps_formatting_as_given() {
        let parsed = PostalCode::parse("01153-000").expect("postal code should parse");
        assert_eq!(parsed.as_str(), "01153-000");
    }

    #[test]
    fn rejects_blank_input() {
        let err = PostalCode::parse("   ").expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyPostalCode);
    }
}
