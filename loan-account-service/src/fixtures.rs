//! In-memory backend and JSON seed fixtures
//!
//! Bundles one in-memory implementation of every collaborator so the CLI and
//! the tests can stand up a complete service without any external system.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use common::error::{Error, ErrorExt, Result};
use common::model::ledger::{AccountLedgerEntity, LedgerRecord};
use common::model::loan_account::LoanAccountEntity;
use common::model::product::{ParamName, ParamValue, ProductDto};
use common::model::profile::CustomerProfileEntity;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clients::{InMemoryCustomerProfileService, InMemoryLedgerApi, InMemoryProductService};
use crate::facade::{AccountLedgerFacade, InMemoryAccountLedgerFacade, InMemoryLoanAccountFacade, LoanAccountFacade};
use crate::processor::{LoanAccountActivator, LoanAccountProcessor};
use crate::service::Collaborators;

/// Product with its parameter values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProduct {
    #[serde(flatten)]
    pub product: ProductDto,
    #[serde(default)]
    pub params: HashMap<ParamName, ParamValue>,
}

/// Seed file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub profiles: Vec<CustomerProfileEntity>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub loan_accounts: Vec<LoanAccountEntity>,
    #[serde(default)]
    pub account_ledgers: Vec<AccountLedgerEntity>,
    #[serde(default)]
    pub ledgers: Vec<LedgerRecord>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).with_context(|| format!("Failed to parse seed file {}", path.display()))
    }

    /// Fail if the seed carries loan accounts or ledger associations.
    ///
    /// Those are only loaded into the in-memory facades, so they cannot be
    /// combined with PostgreSQL storage.
    pub fn ensure_no_stored_accounts(&self) -> Result<()> {
        if !self.loan_accounts.is_empty() || !self.account_ledgers.is_empty() {
            return Err(Error::ConfigurationError(format!(
                "Seed has {} loan accounts and {} account ledgers, which cannot be used with a database",
                self.loan_accounts.len(),
                self.account_ledgers.len()
            )));
        }
        Ok(())
    }
}

/// One in-memory implementation of every collaborator
#[derive(Clone)]
pub struct InMemoryBackend {
    pub loan_accounts: Arc<InMemoryLoanAccountFacade>,
    pub account_ledgers: Arc<InMemoryAccountLedgerFacade>,
    pub profiles: Arc<InMemoryCustomerProfileService>,
    pub products: Arc<InMemoryProductService>,
    pub ledger_api: Arc<InMemoryLedgerApi>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            loan_accounts: Arc::new(InMemoryLoanAccountFacade::new()),
            account_ledgers: Arc::new(InMemoryAccountLedgerFacade::new()),
            profiles: Arc::new(InMemoryCustomerProfileService::new()),
            products: Arc::new(InMemoryProductService::new()),
            ledger_api: Arc::new(InMemoryLedgerApi::new()),
        }
    }

    /// Load a seed into the backend
    pub async fn load(&self, seed: &SeedData) -> Result<()> {
        for profile in &seed.profiles {
            self.profiles.add_profile(profile.clone());
        }

        for product in &seed.products {
            self.products.add_product(product.product.clone());
            for (name, value) in &product.params {
                self.products.set_param(&product.product.product_id, *name, value.clone());
            }
        }

        // Seeded accounts keep their IDs, so they bypass `create_loan_account`
        for account in &seed.loan_accounts {
            self.loan_accounts.idempotency_index.insert(
                (account.customer_profile_id.clone(), account.idempotency_key.clone()),
                account.loan_account_id.clone(),
            );
            self.loan_accounts
                .accounts
                .insert(account.loan_account_id.clone(), account.clone());
        }

        for ledger in &seed.account_ledgers {
            self.account_ledgers.save_account_ledger(ledger.clone()).await?;
        }

        for record in &seed.ledgers {
            self.ledger_api.put_ledger(record.clone());
        }

        info!(
            "Seeded {} profiles, {} products, {} loan accounts, {} ledgers",
            seed.profiles.len(),
            seed.products.len(),
            seed.loan_accounts.len(),
            seed.ledgers.len()
        );
        Ok(())
    }

    /// Wire the backend into service collaborators
    pub fn collaborators(&self, processor: Arc<dyn LoanAccountProcessor>) -> Collaborators {
        Collaborators {
            loan_accounts: self.loan_accounts.clone(),
            account_ledgers: self.account_ledgers.clone(),
            profiles: self.profiles.clone(),
            products: self.products.clone(),
            ledger_api: self.ledger_api.clone(),
            processor,
        }
    }

    /// Same as [`collaborators`](Self::collaborators) but with different loan account storage
    pub fn collaborators_with(
        &self,
        loan_accounts: Arc<dyn LoanAccountFacade>,
        account_ledgers: Arc<dyn AccountLedgerFacade>,
        processor: Arc<dyn LoanAccountProcessor>,
    ) -> Collaborators {
        Collaborators {
            loan_accounts,
            account_ledgers,
            profiles: self.profiles.clone(),
            products: self.products.clone(),
            ledger_api: self.ledger_api.clone(),
            processor,
        }
    }

    /// Activator over the backend's facades and ledger API
    pub fn activator(&self) -> LoanAccountActivator {
        LoanAccountActivator::new(
            self.loan_accounts.clone(),
            self.account_ledgers.clone(),
            self.ledger_api.clone(),
        )
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"{
        "profiles": [{"customer_profile_id": "CP1", "onboarded": true}],
        "products": [{
            "product_id": "LOAN1",
            "product_type": "LOAN_ACCOUNT",
            "params": {
                "LOAN_AMOUNT_RANGE": {"type": "range_integers", "min": 1, "max": 99999},
                "CURRENCY": {"type": "string_list", "values": ["INR"]}
            }
        }],
        "ledgers": [{"ledger_id": "L1", "available_balance": "5000"}],
        "account_ledgers": [{"account_id": "A1", "ledger_type": "LA_AVAILABLE", "ledger_id": "L1"}]
    }"#;

    #[tokio::test]
    async fn loads_seed_into_backend() {
        let seed = SeedData::from_json(SEED).unwrap();
        let backend = InMemoryBackend::new();
        backend.load(&seed).await.unwrap();

        assert_eq!(backend.profiles.profiles.len(), 1);
        let product = backend.products.products.get("LOAN1").unwrap();
        assert!(product.active);
        assert_eq!(backend.products.params.len(), 2);
        assert!(backend.ledger_api.ledgers.contains_key("L1"));

        let ledgers = backend.account_ledgers.list_account_ledgers_by_account_id("A1").await.unwrap();
        assert_eq!(ledgers.len(), 1);
    }

    #[test]
    fn stored_accounts_rejected_for_database_storage() {
        let seed = SeedData::from_json(SEED).unwrap();
        assert!(matches!(seed.ensure_no_stored_accounts(), Err(Error::ConfigurationError(_))));

        let catalogue_only = SeedData {
            account_ledgers: Vec::new(),
            ..seed
        };
        assert!(catalogue_only.ensure_no_stored_accounts().is_ok());
    }

    #[test]
    fn rejects_malformed_seed() {
        assert!(SeedData::from_json("{\"profiles\": 3}").is_err());
    }
}
