//! Persistence facades for loan accounts and their ledger associations

use async_trait::async_trait;
use chrono::Utc;
use common::error::{CmsStatusCode, Error, Result};
use common::model::ledger::AccountLedgerEntity;
use common::model::loan_account::{AccountStatus, LoanAccountEntity};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// Build an account ID from the configured prefix
pub fn generate_account_id(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4().simple()).to_uppercase()
}

/// Loan account facade trait defining the interface for loan account storage
#[async_trait]
pub trait LoanAccountFacade: Send + Sync {
    /// Find the account created by a profile under an idempotency key
    async fn get_account_by_idempotency_key(
        &self,
        customer_profile_id: &str,
        idempotency_key: &str,
    ) -> Result<Option<LoanAccountEntity>>;

    /// Persist a new account, assigning it an ID built from `prefix`
    async fn create_loan_account(&self, entity: LoanAccountEntity, prefix: &str) -> Result<LoanAccountEntity>;

    /// Get an account by ID
    async fn get_loan_account_by_account_id(&self, loan_account_id: &str) -> Result<Option<LoanAccountEntity>>;

    /// Move an account to a new lifecycle status
    async fn update_account_status(&self, loan_account_id: &str, status: AccountStatus) -> Result<LoanAccountEntity>;
}

/// Account ledger facade trait
#[async_trait]
pub trait AccountLedgerFacade: Send + Sync {
    /// List every ledger associated with an account
    async fn list_account_ledgers_by_account_id(&self, account_id: &str) -> Result<Vec<AccountLedgerEntity>>;

    /// Record a ledger association
    async fn save_account_ledger(&self, entity: AccountLedgerEntity) -> Result<AccountLedgerEntity>;
}

/// In-memory loan account storage
pub struct InMemoryLoanAccountFacade {
    /// Accounts by ID
    pub accounts: DashMap<String, LoanAccountEntity>,
    /// Account IDs by customer profile ID and idempotency key
    pub idempotency_index: DashMap<(String, String), String>,
}

impl InMemoryLoanAccountFacade {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            idempotency_index: DashMap::new(),
        }
    }
}

impl Default for InMemoryLoanAccountFacade {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoanAccountFacade for InMemoryLoanAccountFacade {
    async fn get_account_by_idempotency_key(
        &self,
        customer_profile_id: &str,
        idempotency_key: &str,
    ) -> Result<Option<LoanAccountEntity>> {
        let key = (customer_profile_id.to_string(), idempotency_key.to_string());
        let account = self
            .idempotency_index
            .get(&key)
            .and_then(|id| self.accounts.get(id.value()).map(|a| a.clone()));
        Ok(account)
    }

    async fn create_loan_account(&self, mut entity: LoanAccountEntity, prefix: &str) -> Result<LoanAccountEntity> {
        let key = (entity.customer_profile_id.clone(), entity.idempotency_key.clone());

        match self.idempotency_index.entry(key) {
            Entry::Occupied(_) => Err(Error::bad_request(CmsStatusCode::DuplicateIdempotencyKey)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                entity.loan_account_id = generate_account_id(prefix);
                entity.created_at = now;
                entity.updated_at = now;

                debug!("Storing loan account {}", entity.loan_account_id);
                self.accounts.insert(entity.loan_account_id.clone(), entity.clone());
                slot.insert(entity.loan_account_id.clone());
                Ok(entity)
            }
        }
    }

    async fn get_loan_account_by_account_id(&self, loan_account_id: &str) -> Result<Option<LoanAccountEntity>> {
        Ok(self.accounts.get(loan_account_id).map(|a| a.clone()))
    }

    async fn update_account_status(&self, loan_account_id: &str, status: AccountStatus) -> Result<LoanAccountEntity> {
        let mut account = self
            .accounts
            .get_mut(loan_account_id)
            .ok_or_else(|| Error::bad_request(CmsStatusCode::LoanAccountNotFound))?;

        account.status = status;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }
}

/// In-memory ledger association storage
pub struct InMemoryAccountLedgerFacade {
    /// Associations by account ID, in insertion order
    pub ledgers: DashMap<String, Vec<AccountLedgerEntity>>,
}

impl InMemoryAccountLedgerFacade {
    pub fn new() -> Self {
        Self {
            ledgers: DashMap::new(),
        }
    }
}

impl Default for InMemoryAccountLedgerFacade {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountLedgerFacade for InMemoryAccountLedgerFacade {
    async fn list_account_ledgers_by_account_id(&self, account_id: &str) -> Result<Vec<AccountLedgerEntity>> {
        Ok(self
            .ledgers
            .get(account_id)
            .map(|entries| entries.clone())
            .unwrap_or_default())
    }

    async fn save_account_ledger(&self, entity: AccountLedgerEntity) -> Result<AccountLedgerEntity> {
        let mut entries = self.ledgers.entry(entity.account_id.clone()).or_default();

        // One ledger per type; a re-save replaces the association
        entries.retain(|existing| existing.ledger_type != entity.ledger_type);
        entries.push(entity.clone());
        Ok(entity)
    }
}
