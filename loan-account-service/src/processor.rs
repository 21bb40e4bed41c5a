//! Post-creation processing of loan accounts
//!
//! Creation only persists the account in `ACCOUNT_INITIATED`. Opening the
//! ledgers and activating the account happens off the request path: the
//! service hands the account ID to a [`LoanAccountProcessor`], and the queued
//! implementation feeds a worker task that runs the [`LoanAccountActivator`].

use std::sync::Arc;

use async_trait::async_trait;
use common::decimal::{precision, Amount};
use common::error::{CmsStatusCode, Error, ErrorExt, Result};
use common::model::ledger::{AccountLedgerEntity, AccountLedgerType};
use common::model::loan_account::AccountStatus;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clients::LedgerApi;
use crate::facade::{AccountLedgerFacade, LoanAccountFacade};

/// Accepts newly created accounts for processing
#[async_trait]
pub trait LoanAccountProcessor: Send + Sync {
    /// Schedule processing; `false` when the account could not be accepted
    async fn process(&self, loan_account_id: &str) -> Result<bool>;
}

/// Opens the ledgers of an initiated account and activates it
pub struct LoanAccountActivator {
    loan_accounts: Arc<dyn LoanAccountFacade>,
    account_ledgers: Arc<dyn AccountLedgerFacade>,
    ledger_api: Arc<dyn LedgerApi>,
}

impl LoanAccountActivator {
    pub fn new(
        loan_accounts: Arc<dyn LoanAccountFacade>,
        account_ledgers: Arc<dyn AccountLedgerFacade>,
        ledger_api: Arc<dyn LedgerApi>,
    ) -> Self {
        Self {
            loan_accounts,
            account_ledgers,
            ledger_api,
        }
    }

    /// Activate an account. Returns `false` if it was not in `ACCOUNT_INITIATED`.
    ///
    /// Ledgers already associated with the account are reused, so a retry
    /// after a partial failure does not open duplicates.
    pub async fn activate(&self, loan_account_id: &str) -> Result<bool> {
        let account = self
            .loan_accounts
            .get_loan_account_by_account_id(loan_account_id)
            .await
            .with_context(|| format!("Failed to load loan account {}", loan_account_id))?
            .ok_or_else(|| Error::bad_request(CmsStatusCode::LoanAccountNotFound))?;

        if account.status != AccountStatus::AccountInitiated {
            debug!("Skipping loan account {} in status {}", loan_account_id, account.status);
            return Ok(false);
        }

        let existing = self
            .account_ledgers
            .list_account_ledgers_by_account_id(loan_account_id)
            .await?;

        for ledger_type in AccountLedgerType::ALL {
            if existing.iter().any(|l| l.ledger_type == ledger_type) {
                continue;
            }

            let opening_balance = match ledger_type {
                AccountLedgerType::LA_AVAILABLE => precision::round_amount(account.approved_amount()),
                _ => Amount::ZERO,
            };

            let record = self
                .ledger_api
                .create_ledger(&account.customer_profile_id, ledger_type, account.currency, opening_balance)
                .await
                .with_context(|| format!("Failed to open {} ledger for {}", ledger_type, loan_account_id))?;

            self.account_ledgers
                .save_account_ledger(AccountLedgerEntity::new(
                    loan_account_id,
                    ledger_type,
                    record.ledger_id,
                ))
                .await?;
        }

        self.loan_accounts
            .update_account_status(loan_account_id, AccountStatus::Active)
            .await?;

        info!("Activated loan account {}", loan_account_id);
        Ok(true)
    }
}

/// Processor that activates the account before returning
pub struct InlineLoanAccountProcessor {
    activator: Arc<LoanAccountActivator>,
}

impl InlineLoanAccountProcessor {
    pub fn new(activator: Arc<LoanAccountActivator>) -> Self {
        Self { activator }
    }
}

#[async_trait]
impl LoanAccountProcessor for InlineLoanAccountProcessor {
    async fn process(&self, loan_account_id: &str) -> Result<bool> {
        self.activator.activate(loan_account_id).await
    }
}

/// Receiving end of the process queue
pub struct ProcessQueue {
    receiver: mpsc::Receiver<String>,
}

/// Processor that enqueues account IDs for a background worker
pub struct QueuedLoanAccountProcessor {
    sender: mpsc::Sender<String>,
}

impl QueuedLoanAccountProcessor {
    /// Create a processor and the queue its worker drains
    pub fn new(capacity: usize) -> (Self, ProcessQueue) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, ProcessQueue { receiver })
    }
}

#[async_trait]
impl LoanAccountProcessor for QueuedLoanAccountProcessor {
    async fn process(&self, loan_account_id: &str) -> Result<bool> {
        match self.sender.try_send(loan_account_id.to_string()) {
            Ok(()) => {
                debug!("Queued loan account {} for processing", loan_account_id);
                Ok(true)
            }
            Err(TrySendError::Full(_)) => {
                warn!("Process queue full, loan account {} not queued", loan_account_id);
                Ok(false)
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Process queue closed, loan account {} not queued", loan_account_id);
                Ok(false)
            }
        }
    }
}

/// Drain the queue until every processor handle is dropped
pub fn spawn_worker(mut queue: ProcessQueue, activator: Arc<LoanAccountActivator>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(loan_account_id) = queue.receiver.recv().await {
            if let Err(e) = activator.activate(&loan_account_id).await {
                error!("Error processing loan account {}: {}", loan_account_id, e);
            }
        }
        info!("Process queue closed, worker exiting");
    })
}
