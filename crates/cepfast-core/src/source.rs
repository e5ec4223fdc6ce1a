use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{PostalCode, ValidationError};

/// Identifiers of the postal-code sources a race can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceId {
    #[serde(rename = "BrasilAPI")]
    BrasilApi,
    #[serde(rename = "ViaCEP")]
    ViaCep,
}

impl SourceId {
    /// Dispatch order used when building the default source list.
    pub const ALL: [Self; 2] = [Self::BrasilApi, Self::ViaCep];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BrasilApi => "BrasilAPI",
            Self::ViaCep => "ViaCEP",
        }
    }

    /// Path appended after the postal code when building a request URL.
    pub const fn path_suffix(self) -> &'static str {
        match self {
            Self::BrasilApi => "",
            Self::ViaCep => "/json",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "brasilapi" => Ok(Self::BrasilApi),
            "viacep" => Ok(Self::ViaCep),
            _ => Err(ValidationError::UnknownSource {
                value: value.to_owned(),
            }),
        }
    }
}

/// One configured source: which schema it speaks and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub id: SourceId,
    pub endpoint: String,
}

impl SourceDescriptor {
    pub fn new(id: SourceId, endpoint: impl Into<String>) -> Self {
        Self {
            id,
            endpoint: endpoint.into(),
        }
    }

    /// `<endpoint><query><suffix>`, with the query encoded as a path segment.
    pub fn url_for(&self, query: &PostalCode) -> String {
        format!(
            "{}{}{}",
            self.endpoint,
            urlencoding::encode(query.as_str()),
            self.id.path_suffix()
        )
    }
}
