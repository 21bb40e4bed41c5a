//! Error types for the CMS aggregate
//!
//! Every business rule violation surfaces as a single categorized
//! `BadRequest` carrying a machine-readable [`CmsStatusCode`] and a
//! human-readable message. Infrastructure failures (database, serialization,
//! configuration) get their own variants.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable status codes attached to business failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CmsStatusCode {
    /// Generic validation failure, the message carries the detail
    BadRequest,
    /// Product exists but is not a loan account product
    InvalidProductType,
    /// Approved amount outside the product's loan amount range
    ProductApprovedLimitOutOfRange,
    /// Loan account missing, or owned by another customer profile
    LoanAccountNotFound,
    /// A required ledger association or ledger record is missing
    LedgerNotFound,
    /// Product parameter has the wrong shape or an unusable value
    InvalidProductParam,
    /// Product does not exist for the customer profile
    ProductNotFound,
    /// Product exists but is not activated
    ProductNotActivated,
    /// Product has no value configured for a parameter
    ProductParamNotFound,
    /// Customer profile does not exist
    CustomerProfileNotFound,
    /// Customer profile exists but has not completed onboarding
    CustomerProfileNotOnboarded,
    /// Idempotency key already bound to another account
    DuplicateIdempotencyKey,
}

impl CmsStatusCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidProductType => "INVALID_PRODUCT_TYPE",
            Self::ProductApprovedLimitOutOfRange => "PRODUCT_APPROVED_LIMIT_OUT_OF_RANGE",
            Self::LoanAccountNotFound => "LOAN_ACCOUNT_NOT_FOUND",
            Self::LedgerNotFound => "LEDGER_NOT_FOUND",
            Self::InvalidProductParam => "INVALID_PRODUCT_PARAM",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::ProductNotActivated => "PRODUCT_NOT_ACTIVATED",
            Self::ProductParamNotFound => "PRODUCT_PARAM_NOT_FOUND",
            Self::CustomerProfileNotFound => "CUSTOMER_PROFILE_NOT_FOUND",
            Self::CustomerProfileNotOnboarded => "CUSTOMER_PROFILE_NOT_ONBOARDED",
            Self::DuplicateIdempotencyKey => "DUPLICATE_IDEMPOTENCY_KEY",
        }
    }

    /// Message used when a failure carries no more specific detail
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::InvalidProductType => "Product is not a loan account product",
            Self::ProductApprovedLimitOutOfRange => {
                "Approved amount is out of the allowed range for the product"
            }
            Self::LoanAccountNotFound => "Loan account not found",
            Self::LedgerNotFound => "Ledger not found for the account",
            Self::InvalidProductParam => "Product parameter is invalid",
            Self::ProductNotFound => "Product not found",
            Self::ProductNotActivated => "Product is not activated",
            Self::ProductParamNotFound => "Product parameter not found",
            Self::CustomerProfileNotFound => "Customer profile not found",
            Self::CustomerProfileNotOnboarded => "Customer profile is not onboarded",
            Self::DuplicateIdempotencyKey => "Idempotency key already used",
        }
    }
}

impl Display for CmsStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CMS error type
#[derive(Debug, Error)]
pub enum Error {
    /// Business rule violation
    #[error("{message}")]
    BadRequest {
        /// Machine-readable status code
        code: CmsStatusCode,
        /// Human-readable message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (fixture files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decimal conversion error
    #[error("Decimal conversion error: {0}")]
    DecimalError(String),
}

impl Error {
    /// Bad request carrying the code's default message
    pub fn bad_request(code: CmsStatusCode) -> Self {
        Error::BadRequest {
            code,
            message: code.default_message().to_string(),
        }
    }

    /// Bad request with an explicit message
    pub fn bad_request_with_message(code: CmsStatusCode, message: impl Into<String>) -> Self {
        Error::BadRequest {
            code,
            message: message.into(),
        }
    }

    /// Status code of a business failure, `None` for infrastructure errors
    pub fn status_code(&self) -> Option<CmsStatusCode> {
        match self {
            Error::BadRequest { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                // Business messages are user facing and stay untouched
                Error::BadRequest { code, message } => Error::BadRequest { code, message },
                Error::ConfigurationError(msg) => Error::ConfigurationError(format!("{}: {}", context, msg)),
                Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
                Error::DecimalError(msg) => Error::DecimalError(format!("{}: {}", context, msg)),
                Error::Database(e) => Error::Internal(format!("{}: {}", context, e)),
                Error::Serialization(e) => Error::Serialization(e),
                Error::Io(e) => Error::Internal(format!("{}: {}", context, e)),
            }
        })
    }
}

/// Convert string messages into an error
impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Internal(message)
    }
}

/// Convert static string references into an error
impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Internal(message.to_string())
    }
}

/// From rust_decimal::Error
impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::DecimalError(err.to_string())
    }
}
