//! Loan account service implementation

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use common::decimal::{precision, Amount};
use common::error::{CmsStatusCode, Error, ErrorExt, Result};
use common::model::ledger::{AccountLedgerEntity, AccountLedgerType, LedgerRecord};
use common::model::loan_account::{
    AccountStatus, LoanAccountBalance, LoanAccountEntity, LoanAccountRequest, LoanAccountResponse,
};
use common::model::origin::Origin;
use common::model::product::{ParamName, ParamValue};
use tracing::{debug, info, instrument, warn};

use crate::clients::{CustomerProfileService, LedgerApi, ProductService};
use crate::facade::{AccountLedgerFacade, LoanAccountFacade};
use crate::processor::LoanAccountProcessor;
use crate::validation;

/// Prefix of generated loan account IDs
pub const LOAN_ACCOUNT_PREFIX: &str = "LA";

/// Collaborators the service is wired with
#[derive(Clone)]
pub struct Collaborators {
    pub loan_accounts: Arc<dyn LoanAccountFacade>,
    pub account_ledgers: Arc<dyn AccountLedgerFacade>,
    pub profiles: Arc<dyn CustomerProfileService>,
    pub products: Arc<dyn ProductService>,
    pub ledger_api: Arc<dyn LedgerApi>,
    pub processor: Arc<dyn LoanAccountProcessor>,
}

/// Loan account lifecycle: creation and balance retrieval
pub struct LoanAccountService {
    loan_accounts: Arc<dyn LoanAccountFacade>,
    account_ledgers: Arc<dyn AccountLedgerFacade>,
    profiles: Arc<dyn CustomerProfileService>,
    products: Arc<dyn ProductService>,
    ledger_api: Arc<dyn LedgerApi>,
    processor: Arc<dyn LoanAccountProcessor>,
    account_prefix: String,
}

impl LoanAccountService {
    /// Create a service generating IDs with [`LOAN_ACCOUNT_PREFIX`]
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_prefix(collaborators, LOAN_ACCOUNT_PREFIX)
    }

    /// Create a service with a custom account ID prefix
    pub fn with_prefix(collaborators: Collaborators, account_prefix: impl Into<String>) -> Self {
        Self {
            loan_accounts: collaborators.loan_accounts,
            account_ledgers: collaborators.account_ledgers,
            profiles: collaborators.profiles,
            products: collaborators.products,
            ledger_api: collaborators.ledger_api,
            processor: collaborators.processor,
            account_prefix: account_prefix.into(),
        }
    }

    /// Create a loan account, or return the one already created under
    /// `idempotency_key`.
    ///
    /// Product parameters are fetched one at a time, in validation order, so
    /// a failed check never triggers the lookups behind it.
    #[instrument(skip(self, request, origin), fields(product_id = %request.product_id, origin = %origin))]
    pub async fn create_loan_account(
        &self,
        customer_profile_id: &str,
        request: &LoanAccountRequest,
        idempotency_key: &str,
        origin: Origin,
    ) -> Result<LoanAccountResponse> {
        if let Some(existing) = self
            .loan_accounts
            .get_account_by_idempotency_key(customer_profile_id, idempotency_key)
            .await
            .with_context(|| format!("Failed to look up idempotency key {}", idempotency_key))?
        {
            info!("Idempotent replay for key {}, returning account {}", idempotency_key, existing.loan_account_id);
            // Still initiated: the earlier hand-off was dropped or failed
            if existing.status == AccountStatus::AccountInitiated {
                self.request_processing(&existing.loan_account_id).await?;
            }
            return Ok(LoanAccountResponse::from(&existing));
        }

        self.profiles
            .validate_onboard_and_get_customer_profile(customer_profile_id)
            .await?;

        let product_id = request.product_id.as_str();
        let product = self
            .products
            .validate_product_activated(customer_profile_id, product_id)
            .await?;
        validation::ensure_loan_product(&product)?;

        let terms = &request.account_param;

        let amount_range = self.product_param(customer_profile_id, product_id, ParamName::LoanAmountRange).await?;
        validation::validate_approved_amount(terms.approved_amount, &amount_range)?;

        let tenure_range = self.product_param(customer_profile_id, product_id, ParamName::LoanTenureRange).await?;
        validation::validate_tenure(terms.tenure, &tenure_range)?;

        let rate_range = self.product_param(customer_profile_id, product_id, ParamName::InterestRateRange).await?;
        validation::validate_interest_rate(terms.interest_rate, &rate_range)?;

        let country = self.product_param(customer_profile_id, product_id, ParamName::Country).await?;
        let country = validation::country_from_param(&country)?;

        let currency = self.product_param(customer_profile_id, product_id, ParamName::Currency).await?;
        let currency = validation::currency_from_param(&currency)?;

        let now = Utc::now();
        let entity = LoanAccountEntity {
            loan_account_id: String::new(),
            customer_profile_id: customer_profile_id.to_string(),
            end_customer_profile_id: request.end_customer_profile_id.clone(),
            product_id: request.product_id.clone(),
            idempotency_key: idempotency_key.to_string(),
            approved_amount: terms.approved_amount,
            tenure: terms.tenure,
            interest_rate: precision::round_rate(terms.interest_rate),
            country,
            currency,
            status: AccountStatus::AccountInitiated,
            origin,
            created_at: now,
            updated_at: now,
        };

        let created = match self.loan_accounts.create_loan_account(entity, &self.account_prefix).await {
            Ok(created) => created,
            // A concurrent request with the same key won the insert
            Err(e) if e.status_code() == Some(CmsStatusCode::DuplicateIdempotencyKey) => {
                let existing = self
                    .loan_accounts
                    .get_account_by_idempotency_key(customer_profile_id, idempotency_key)
                    .await?
                    .ok_or(e)?;
                info!("Lost idempotency race for key {}, returning account {}", idempotency_key, existing.loan_account_id);
                return Ok(LoanAccountResponse::from(&existing));
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create loan account for profile {}", customer_profile_id))
            }
        };

        info!("Created loan account {}", created.loan_account_id);

        self.request_processing(&created.loan_account_id).await?;

        Ok(LoanAccountResponse {
            account_id: created.loan_account_id,
            account_status: AccountStatus::AccountInitiated,
            product_id: created.product_id,
            currency: created.currency,
        })
    }

    /// Aggregate the available, recovered and lent balances of an account
    #[instrument(skip(self, origin), fields(origin = %origin))]
    pub async fn get_account_balance(
        &self,
        customer_profile_id: &str,
        account_id: &str,
        origin: Origin,
    ) -> Result<LoanAccountBalance> {
        // A foreign account is reported exactly like a missing one
        let account = self
            .loan_accounts
            .get_loan_account_by_account_id(account_id)
            .await
            .with_context(|| format!("Failed to retrieve loan account {}", account_id))?
            .filter(|account| account.customer_profile_id == customer_profile_id)
            .ok_or_else(|| Error::bad_request(CmsStatusCode::LoanAccountNotFound))?;

        let account_ledgers = self
            .account_ledgers
            .list_account_ledgers_by_account_id(account_id)
            .await?;

        let ledger_ids: Vec<String> = account_ledgers.iter().map(|l| l.ledger_id.clone()).collect();
        debug!("Fetching {} ledgers for account {}", ledger_ids.len(), account_id);

        let records = self.ledger_api.get_ledgers(customer_profile_id, &ledger_ids).await?;
        let records_by_id: HashMap<&str, &LedgerRecord> =
            records.iter().map(|r| (r.ledger_id.as_str(), r)).collect();

        let available_balance =
            resolve_balance(&account_ledgers, &records_by_id, AccountLedgerType::LA_AVAILABLE)?;

        let recovered_balance =
            resolve_balance(&account_ledgers, &records_by_id, AccountLedgerType::LA_RECOVERED)?;
        let lent_balance = resolve_balance(&account_ledgers, &records_by_id, AccountLedgerType::CA_AVAILABLE)?;

        Ok(LoanAccountBalance {
            loan_account_id: account.loan_account_id,
            available_balance,
            recovered_balance,
            lent_balance,
            currency: account.currency,
        })
    }

    async fn request_processing(&self, loan_account_id: &str) -> Result<()> {
        if !self.processor.process(loan_account_id).await? {
            warn!("Loan account {} was not accepted for processing", loan_account_id);
        }
        Ok(())
    }

    async fn product_param(
        &self,
        customer_profile_id: &str,
        product_id: &str,
        name: ParamName,
    ) -> Result<ParamValue> {
        debug!("Fetching product parameter {} for {}", name, product_id);
        self.products.get_product_param(customer_profile_id, product_id, name).await
    }
}

/// Join the single ledger of `ledger_type` to its record
fn resolve_balance(
    account_ledgers: &[AccountLedgerEntity],
    records_by_id: &HashMap<&str, &LedgerRecord>,
    ledger_type: AccountLedgerType,
) -> Result<Amount> {
    let mut matching = account_ledgers.iter().filter(|l| l.ledger_type == ledger_type);

    let ledger = matching.next().ok_or_else(|| {
        Error::bad_request_with_message(
            CmsStatusCode::LedgerNotFound,
            format!("No {} ledger associated with the account", ledger_type),
        )
    })?;

    if matching.next().is_some() {
        return Err(Error::Internal(format!(
            "Multiple {} ledgers associated with account {}",
            ledger_type, ledger.account_id
        )));
    }

    records_by_id
        .get(ledger.ledger_id.as_str())
        .map(|record| record.available_balance)
        .ok_or_else(|| {
            Error::bad_request_with_message(
                CmsStatusCode::LedgerNotFound,
                format!("{} ledger {} not returned by the ledger service", ledger_type, ledger.ledger_id),
            )
        })
}
