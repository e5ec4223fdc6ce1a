use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Canonical address record shared by every source.
///
/// Sources may omit any field; a missing field is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub postal_code: String,
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
}

impl Address {
    /// `city/state`, or whichever half is present.
    pub fn locality(&self) -> String {
        match (self.city.is_empty(), self.state.is_empty()) {
            (false, false) => format!("{}/{}", self.city, self.state),
            (false, true) => self.city.clone(),
            (true, false) => self.state.clone(),
            (true, true) => String::new(),
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let locality = self.locality();
        let parts = [self.street.as_str(), self.district.as_str(), locality.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>();

        if self.postal_code.is_empty() {
            return f.write_str(&parts.join(", "));
        }
        if parts.is_empty() {
            return f.write_str(&self.postal_code);
        }
        write!(f, "{} {}", self.postal_code, parts.join(", "))
    }
}
