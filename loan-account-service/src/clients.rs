//! Downstream service clients: product catalogue, customer profiles, ledgers
//!
//! Each collaborator is a trait so the service can be wired against the real
//! internal APIs or against the in-memory implementations below, which back
//! the CLI and the tests.

use async_trait::async_trait;
use common::decimal::Amount;
use common::error::{CmsStatusCode, Error, Result};
use common::model::currency::Currency;
use common::model::ledger::{AccountLedgerType, LedgerRecord, METADATA_LEDGER_TYPE};
use common::model::product::{ParamName, ParamValue, ProductDto};
use common::model::profile::CustomerProfileEntity;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// Product catalogue
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Fetch a product, failing unless it exists and is activated
    async fn validate_product_activated(&self, customer_profile_id: &str, product_id: &str) -> Result<ProductDto>;

    /// Fetch one configured parameter of a product
    async fn get_product_param(
        &self,
        customer_profile_id: &str,
        product_id: &str,
        param_name: ParamName,
    ) -> Result<ParamValue>;
}

/// Customer profile service
#[async_trait]
pub trait CustomerProfileService: Send + Sync {
    /// Fetch a profile, failing unless onboarding has completed
    async fn validate_onboard_and_get_customer_profile(&self, customer_profile_id: &str) -> Result<CustomerProfileEntity>;
}

/// Ledger subsystem
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Fetch ledger records in bulk; unknown IDs are omitted from the result
    async fn get_ledgers(&self, customer_profile_id: &str, ledger_ids: &[String]) -> Result<Vec<LedgerRecord>>;

    /// Open a new ledger with an opening balance
    async fn create_ledger(
        &self,
        customer_profile_id: &str,
        ledger_type: AccountLedgerType,
        currency: Currency,
        opening_balance: Amount,
    ) -> Result<LedgerRecord>;
}

/// In-memory product catalogue
pub struct InMemoryProductService {
    /// Products by ID
    pub products: DashMap<String, ProductDto>,
    /// Parameter values by product ID and name
    pub params: DashMap<(String, ParamName), ParamValue>,
}

impl InMemoryProductService {
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
            params: DashMap::new(),
        }
    }

    /// Register a product
    pub fn add_product(&self, product: ProductDto) {
        self.products.insert(product.product_id.clone(), product);
    }

    /// Set a product parameter
    pub fn set_param(&self, product_id: &str, name: ParamName, value: ParamValue) {
        self.params.insert((product_id.to_string(), name), value);
    }
}

impl Default for InMemoryProductService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductService for InMemoryProductService {
    async fn validate_product_activated(&self, customer_profile_id: &str, product_id: &str) -> Result<ProductDto> {
        debug!("Validating product {} for profile {}", product_id, customer_profile_id);

        let product = self
            .products
            .get(product_id)
            .map(|p| p.clone())
            .ok_or_else(|| Error::bad_request(CmsStatusCode::ProductNotFound))?;

        if !product.active {
            return Err(Error::bad_request(CmsStatusCode::ProductNotActivated));
        }

        Ok(product)
    }

    async fn get_product_param(
        &self,
        _customer_profile_id: &str,
        product_id: &str,
        param_name: ParamName,
    ) -> Result<ParamValue> {
        self.params
            .get(&(product_id.to_string(), param_name))
            .map(|v| v.clone())
            .ok_or_else(|| {
                Error::bad_request_with_message(
                    CmsStatusCode::ProductParamNotFound,
                    format!("Product {} has no {} configured", product_id, param_name),
                )
            })
    }
}

/// In-memory customer profile directory
pub struct InMemoryCustomerProfileService {
    /// Profiles by ID
    pub profiles: DashMap<String, CustomerProfileEntity>,
}

impl InMemoryCustomerProfileService {
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
        }
    }

    /// Register a profile
    pub fn add_profile(&self, profile: CustomerProfileEntity) {
        self.profiles.insert(profile.customer_profile_id.clone(), profile);
    }
}

impl Default for InMemoryCustomerProfileService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CustomerProfileService for InMemoryCustomerProfileService {
    async fn validate_onboard_and_get_customer_profile(&self, customer_profile_id: &str) -> Result<CustomerProfileEntity> {
        let profile = self
            .profiles
            .get(customer_profile_id)
            .map(|p| p.clone())
            .ok_or_else(|| Error::bad_request(CmsStatusCode::CustomerProfileNotFound))?;

        if !profile.onboarded {
            return Err(Error::bad_request(CmsStatusCode::CustomerProfileNotOnboarded));
        }

        Ok(profile)
    }
}

/// In-memory ledger subsystem
pub struct InMemoryLedgerApi {
    /// Ledger records by ID
    pub ledgers: DashMap<String, LedgerRecord>,
}

impl InMemoryLedgerApi {
    pub fn new() -> Self {
        Self {
            ledgers: DashMap::new(),
        }
    }

    /// Insert or replace a ledger record
    pub fn put_ledger(&self, record: LedgerRecord) {
        self.ledgers.insert(record.ledger_id.clone(), record);
    }
}

impl Default for InMemoryLedgerApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerApi for InMemoryLedgerApi {
    async fn get_ledgers(&self, _customer_profile_id: &str, ledger_ids: &[String]) -> Result<Vec<LedgerRecord>> {
        Ok(ledger_ids
            .iter()
            .filter_map(|id| self.ledgers.get(id).map(|r| r.clone()))
            .collect())
    }

    async fn create_ledger(
        &self,
        customer_profile_id: &str,
        ledger_type: AccountLedgerType,
        currency: Currency,
        opening_balance: Amount,
    ) -> Result<LedgerRecord> {
        let ledger_id = format!("LDG{}", Uuid::new_v4().simple()).to_uppercase();
        debug!("Opening {} ledger {} for profile {}", ledger_type, ledger_id, customer_profile_id);

        let mut record = LedgerRecord::new(ledger_id, opening_balance)
            .with_metadata(METADATA_LEDGER_TYPE, ledger_type.as_str());
        record.currency = Some(currency);

        self.ledgers.insert(record.ledger_id.clone(), record.clone());
        Ok(record)
    }
}
