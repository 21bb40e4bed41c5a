//! Loan account models and related types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Amount, InterestRate};
use crate::error::{Error, Result};
use crate::model::currency::Currency;
use crate::model::origin::Origin;

/// Lifecycle status of a loan account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Persisted, ledgers not yet opened
    AccountInitiated,
    /// Ledgers opened, account usable
    Active,
    /// Closed
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::AccountInitiated => "ACCOUNT_INITIATED",
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACCOUNT_INITIATED" => Ok(AccountStatus::AccountInitiated),
            "ACTIVE" => Ok(AccountStatus::Active),
            "CLOSED" => Ok(AccountStatus::Closed),
            other => Err(Error::Internal(format!("Unknown account status: {}", other))),
        }
    }
}

/// Requested loan terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountParam {
    /// Approved principal, in whole currency units
    pub approved_amount: i64,
    /// Tenure in months
    pub tenure: i64,
    /// Annual interest rate in percent
    pub interest_rate: InterestRate,
}

/// Loan account creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanAccountRequest {
    /// Product to open the account under
    pub product_id: String,
    /// Borrower profile ID
    pub end_customer_profile_id: String,
    /// Requested terms
    pub account_param: AccountParam,
}

/// Persisted loan account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanAccountEntity {
    /// Account ID, assigned by the facade on creation
    pub loan_account_id: String,
    /// Owning customer profile ID
    pub customer_profile_id: String,
    /// Borrower profile ID
    pub end_customer_profile_id: String,
    /// Product ID
    pub product_id: String,
    /// Idempotency key supplied at creation
    pub idempotency_key: String,
    /// Approved principal
    pub approved_amount: i64,
    /// Tenure in months
    pub tenure: i64,
    /// Annual interest rate in percent
    pub interest_rate: InterestRate,
    /// Country code from product configuration
    pub country: String,
    /// Account currency
    pub currency: Currency,
    /// Lifecycle status
    pub status: AccountStatus,
    /// Channel the account was created through
    pub origin: Origin,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl LoanAccountEntity {
    /// Approved principal as a ledger amount
    pub fn approved_amount(&self) -> Amount {
        Amount::from(self.approved_amount)
    }
}

/// Loan account as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanAccountResponse {
    /// Account ID
    pub account_id: String,
    /// Lifecycle status
    pub account_status: AccountStatus,
    /// Product ID
    pub product_id: String,
    /// Account currency
    pub currency: Currency,
}

impl From<&LoanAccountEntity> for LoanAccountResponse {
    fn from(entity: &LoanAccountEntity) -> Self {
        Self {
            account_id: entity.loan_account_id.clone(),
            account_status: entity.status,
            product_id: entity.product_id.clone(),
            currency: entity.currency,
        }
    }
}

/// Aggregated balances of a loan account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanAccountBalance {
    /// Account ID
    pub loan_account_id: String,
    /// Balance of the `LA_AVAILABLE` ledger
    pub available_balance: Amount,
    /// Balance of the `LA_RECOVERED` ledger
    pub recovered_balance: Amount,
    /// Balance of the `CA_AVAILABLE` ledger
    pub lent_balance: Amount,
    /// Account currency
    pub currency: Currency,
}
