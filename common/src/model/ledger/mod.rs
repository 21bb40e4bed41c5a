//! Ledger models
//!
//! A loan account owns several ledgers in the ledger subsystem, one per
//! balance category. [`AccountLedgerEntity`] is the association kept by the
//! aggregate; [`LedgerRecord`] is the balance snapshot returned by the
//! ledger subsystem.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decimal::Amount;
use crate::error::{CmsStatusCode, Error};
use crate::model::currency::Currency;

/// Metadata key under which the ledger subsystem echoes the ledger type
pub const METADATA_LEDGER_TYPE: &str = "ledgerType";

/// Balance category of a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum AccountLedgerType {
    /// Loan amount still available to draw
    LA_AVAILABLE,
    /// Amount recovered from the borrower
    LA_RECOVERED,
    /// Amount lent out, tracked on the credit side
    CA_AVAILABLE,
}

impl AccountLedgerType {
    /// Every ledger a loan account is opened with
    pub const ALL: [AccountLedgerType; 3] = [
        AccountLedgerType::LA_AVAILABLE,
        AccountLedgerType::LA_RECOVERED,
        AccountLedgerType::CA_AVAILABLE,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountLedgerType::LA_AVAILABLE => "LA_AVAILABLE",
            AccountLedgerType::LA_RECOVERED => "LA_RECOVERED",
            AccountLedgerType::CA_AVAILABLE => "CA_AVAILABLE",
        }
    }
}

impl fmt::Display for AccountLedgerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountLedgerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LA_AVAILABLE" => Ok(AccountLedgerType::LA_AVAILABLE),
            "LA_RECOVERED" => Ok(AccountLedgerType::LA_RECOVERED),
            "CA_AVAILABLE" => Ok(AccountLedgerType::CA_AVAILABLE),
            other => Err(Error::bad_request_with_message(
                CmsStatusCode::LedgerNotFound,
                format!("Unknown ledger type: {}", other),
            )),
        }
    }
}

/// Association between an account and one of its ledgers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedgerEntity {
    /// Owning account ID
    pub account_id: String,
    /// Balance category
    pub ledger_type: AccountLedgerType,
    /// Ledger ID in the ledger subsystem
    pub ledger_id: String,
}

impl AccountLedgerEntity {
    pub fn new(account_id: impl Into<String>, ledger_type: AccountLedgerType, ledger_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ledger_type,
            ledger_id: ledger_id.into(),
        }
    }
}

/// Balance snapshot of a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Ledger ID
    pub ledger_id: String,
    /// Available balance
    pub available_balance: Amount,
    /// Ledger currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    /// Free-form attributes set by the ledger subsystem
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl LedgerRecord {
    pub fn new(ledger_id: impl Into<String>, available_balance: Amount) -> Self {
        Self {
            ledger_id: ledger_id.into(),
            available_balance,
            currency: None,
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
