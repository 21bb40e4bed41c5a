//! Currency codes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CmsStatusCode, Error};

/// ISO 4217 currencies configured in the product catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    INR,
    PKR,
    USD,
    EUR,
    GBP,
    AED,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::PKR => "PKR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::AED => "AED",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Currency::INR),
            "PKR" => Ok(Currency::PKR),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "AED" => Ok(Currency::AED),
            other => Err(Error::bad_request_with_message(
                CmsStatusCode::InvalidProductParam,
                format!("Unsupported currency: {}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("inr".parse::<Currency>().unwrap(), Currency::INR);
        assert_eq!(" PKR ".parse::<Currency>().unwrap(), Currency::PKR);
        let err = "XYZ".parse::<Currency>().unwrap_err();
        assert_eq!(err.status_code(), Some(CmsStatusCode::InvalidProductParam));
    }
}
