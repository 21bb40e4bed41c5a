//! Request origin

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CmsStatusCode, Error};

/// Channel a request entered the aggregate through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// End customer facing apps
    Customer,
    /// Back office tooling
    Admin,
    /// Internal jobs
    System,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Customer => "CUSTOMER",
            Origin::Admin => "ADMIN",
            Origin::System => "SYSTEM",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CUSTOMER" => Ok(Origin::Customer),
            "ADMIN" => Ok(Origin::Admin),
            "SYSTEM" => Ok(Origin::System),
            other => Err(Error::bad_request_with_message(
                CmsStatusCode::BadRequest,
                format!("Unknown origin: {}", other),
            )),
        }
    }
}
