// Recording collaborators for call-order assertions

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::decimal::{dec, Amount};
use common::error::Result;
use common::model::currency::Currency;
use common::model::ledger::{AccountLedgerEntity, AccountLedgerType, LedgerRecord};
use common::model::loan_account::{AccountParam, AccountStatus, LoanAccountEntity, LoanAccountRequest};
use common::model::origin::Origin;
use common::model::product::{DecimalRange, IntegerRange, ParamName, ParamValue, ProductDto, ProductType};
use common::model::profile::CustomerProfileEntity;
use loan_account_service::{
    AccountLedgerFacade, Collaborators, CustomerProfileService, InMemoryBackend, LedgerApi, LoanAccountFacade,
    LoanAccountProcessor, LoanAccountService, ProductService,
};

pub const CUSTOMER_PROFILE_ID: &str = "TEST_CUSTOMER_PROFILE_ID";
pub const LOAN_ACCOUNT_ID: &str = "TEST_LOAN_ACCOUNT_ID";
pub const ACCOUNT_ID: &str = "TEST_ACCOUNT_ID";
pub const LEDGER_ID: &str = "TEST_LEDGER_ID";
pub const PRODUCT_ID: &str = "TEST_PRODUCT_ID";
pub const IDEMPOTENCY_KEY: &str = "TEST_IDEMPOTENT_KEY";
pub const END_CUSTOMER_PROFILE_ID: &str = "TEST_END_CUSTOMER_PROFILE_ID";

/// Ordered log of collaborator calls
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn record(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

pub fn param_call(name: ParamName) -> String {
    format!("get_product_param:{}", name)
}

struct RecordingLoanAccounts {
    inner: Arc<dyn LoanAccountFacade>,
    log: CallLog,
}

#[async_trait]
impl LoanAccountFacade for RecordingLoanAccounts {
    async fn get_account_by_idempotency_key(&self, profile: &str, key: &str) -> Result<Option<LoanAccountEntity>> {
        self.log.record("get_account_by_idempotency_key");
        self.inner.get_account_by_idempotency_key(profile, key).await
    }

    async fn create_loan_account(&self, entity: LoanAccountEntity, prefix: &str) -> Result<LoanAccountEntity> {
        self.log.record(format!("create_loan_account:{}", prefix));
        self.inner.create_loan_account(entity, prefix).await
    }

    async fn get_loan_account_by_account_id(&self, id: &str) -> Result<Option<LoanAccountEntity>> {
        self.log.record("get_loan_account_by_account_id");
        self.inner.get_loan_account_by_account_id(id).await
    }

    async fn update_account_status(&self, id: &str, status: AccountStatus) -> Result<LoanAccountEntity> {
        self.log.record("update_account_status");
        self.inner.update_account_status(id, status).await
    }
}

struct RecordingAccountLedgers {
    inner: Arc<dyn AccountLedgerFacade>,
    log: CallLog,
}

#[async_trait]
impl AccountLedgerFacade for RecordingAccountLedgers {
    async fn list_account_ledgers_by_account_id(&self, account_id: &str) -> Result<Vec<AccountLedgerEntity>> {
        self.log.record("list_account_ledgers_by_account_id");
        self.inner.list_account_ledgers_by_account_id(account_id).await
    }

    async fn save_account_ledger(&self, entity: AccountLedgerEntity) -> Result<AccountLedgerEntity> {
        self.log.record("save_account_ledger");
        self.inner.save_account_ledger(entity).await
    }
}

struct RecordingProfiles {
    inner: Arc<dyn CustomerProfileService>,
    log: CallLog,
}

#[async_trait]
impl CustomerProfileService for RecordingProfiles {
    async fn validate_onboard_and_get_customer_profile(&self, id: &str) -> Result<CustomerProfileEntity> {
        self.log.record("validate_onboard_and_get_customer_profile");
        self.inner.validate_onboard_and_get_customer_profile(id).await
    }
}

struct RecordingProducts {
    inner: Arc<dyn ProductService>,
    log: CallLog,
}

#[async_trait]
impl ProductService for RecordingProducts {
    async fn validate_product_activated(&self, profile: &str, product_id: &str) -> Result<ProductDto> {
        self.log.record("validate_product_activated");
        self.inner.validate_product_activated(profile, product_id).await
    }

    async fn get_product_param(&self, profile: &str, product_id: &str, name: ParamName) -> Result<ParamValue> {
        self.log.record(param_call(name));
        self.inner.get_product_param(profile, product_id, name).await
    }
}

struct RecordingLedgerApi {
    inner: Arc<dyn LedgerApi>,
    log: CallLog,
}

#[async_trait]
impl LedgerApi for RecordingLedgerApi {
    async fn get_ledgers(&self, profile: &str, ledger_ids: &[String]) -> Result<Vec<LedgerRecord>> {
        self.log.record(format!("get_ledgers:{}", ledger_ids.join(",")));
        self.inner.get_ledgers(profile, ledger_ids).await
    }

    async fn create_ledger(
        &self,
        profile: &str,
        ledger_type: AccountLedgerType,
        currency: Currency,
        opening_balance: Amount,
    ) -> Result<LedgerRecord> {
        self.log.record(format!("create_ledger:{}", ledger_type));
        self.inner.create_ledger(profile, ledger_type, currency, opening_balance).await
    }
}

/// Processor that only records the call
pub struct RecordingProcessor {
    log: CallLog,
    accept: bool,
}

#[async_trait]
impl LoanAccountProcessor for RecordingProcessor {
    async fn process(&self, loan_account_id: &str) -> Result<bool> {
        self.log.record(format!("process:{}", loan_account_id));
        Ok(self.accept)
    }
}

/// Service wired to recording wrappers around an in-memory backend
pub struct Harness {
    pub backend: InMemoryBackend,
    pub calls: CallLog,
    pub service: LoanAccountService,
}

impl Harness {
    /// Backend with an onboarded profile and a configured loan product
    pub fn new() -> Self {
        Self::with_processor_accepting(true)
    }

    pub fn with_processor_accepting(accept: bool) -> Self {
        let backend = InMemoryBackend::new();
        seed_loan_product(&backend);

        let calls = CallLog::default();
        let collaborators = Collaborators {
            loan_accounts: Arc::new(RecordingLoanAccounts {
                inner: backend.loan_accounts.clone(),
                log: calls.clone(),
            }),
            account_ledgers: Arc::new(RecordingAccountLedgers {
                inner: backend.account_ledgers.clone(),
                log: calls.clone(),
            }),
            profiles: Arc::new(RecordingProfiles {
                inner: backend.profiles.clone(),
                log: calls.clone(),
            }),
            products: Arc::new(RecordingProducts {
                inner: backend.products.clone(),
                log: calls.clone(),
            }),
            ledger_api: Arc::new(RecordingLedgerApi {
                inner: backend.ledger_api.clone(),
                log: calls.clone(),
            }),
            processor: Arc::new(RecordingProcessor {
                log: calls.clone(),
                accept,
            }),
        };

        Self {
            service: LoanAccountService::new(collaborators),
            backend,
            calls,
        }
    }
}

pub fn seed_loan_product(backend: &InMemoryBackend) {
    backend.profiles.add_profile(CustomerProfileEntity {
        customer_profile_id: CUSTOMER_PROFILE_ID.to_string(),
        name: "Test Customer".to_string(),
        onboarded: true,
    });

    backend.products.add_product(ProductDto {
        product_id: PRODUCT_ID.to_string(),
        product_type: ProductType::LoanAccount,
        active: true,
    });
    backend.products.set_param(
        PRODUCT_ID,
        ParamName::LoanAmountRange,
        ParamValue::RangeIntegers(IntegerRange::new(1, 99999)),
    );
    backend.products.set_param(
        PRODUCT_ID,
        ParamName::LoanTenureRange,
        ParamValue::RangeIntegers(IntegerRange::new(1, 99999)),
    );
    backend.products.set_param(
        PRODUCT_ID,
        ParamName::InterestRateRange,
        ParamValue::RangeDecimals(DecimalRange::new(dec!(1.5), dec!(99999))),
    );
    backend.products.set_param(PRODUCT_ID, ParamName::Country, ParamValue::string_list(["IND"]));
    backend.products.set_param(PRODUCT_ID, ParamName::Currency, ParamValue::string_list(["INR"]));
}

pub fn loan_request(approved_amount: i64, tenure: i64, interest_rate: Amount) -> LoanAccountRequest {
    LoanAccountRequest {
        product_id: PRODUCT_ID.to_string(),
        end_customer_profile_id: END_CUSTOMER_PROFILE_ID.to_string(),
        account_param: AccountParam {
            approved_amount,
            tenure,
            interest_rate,
        },
    }
}

/// Account owned by `customer_profile_id`, stored under [`ACCOUNT_ID`]
pub fn stored_account(customer_profile_id: &str) -> LoanAccountEntity {
    let now = chrono::Utc::now();
    LoanAccountEntity {
        loan_account_id: LOAN_ACCOUNT_ID.to_string(),
        customer_profile_id: customer_profile_id.to_string(),
        end_customer_profile_id: END_CUSTOMER_PROFILE_ID.to_string(),
        product_id: PRODUCT_ID.to_string(),
        idempotency_key: "SEEDED_KEY".to_string(),
        approved_amount: 5000,
        tenure: 12,
        interest_rate: dec!(10),
        country: "PAK".to_string(),
        currency: Currency::PKR,
        status: AccountStatus::Active,
        origin: Origin::Customer,
        created_at: now,
        updated_at: now,
    }
}
