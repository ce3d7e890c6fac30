use std::fmt::{Display, Formatter};

use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// An opaque identity, e.g. a public key or account identifier.
///
/// Principals carry no attributes beyond their identity and are only ever
/// compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Is this the null principal?
    ///
    /// Both the empty identity and the all-zero address (with or without a
    /// `0x` prefix) are null; neither may own anything or be registered.
    pub fn is_null(&self) -> bool {
        let id = self.0.trim();
        let id = id.strip_prefix("0x").unwrap_or(id);
        id.chars().all(|c| c == '0')
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'a> FromParam<'a> for Principal {
    type Error = std::convert::Infallible;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        Ok(Self::new(param))
    }
}
