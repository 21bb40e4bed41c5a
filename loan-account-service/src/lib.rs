//! Loan account service: idempotent account creation and ledger-backed balances

pub mod clients;
pub mod config;
pub mod facade;
pub mod fixtures;
pub mod postgres;
pub mod processor;
pub mod service;
pub mod validation;

pub use clients::{
    CustomerProfileService, InMemoryCustomerProfileService, InMemoryLedgerApi, InMemoryProductService,
    LedgerApi, ProductService,
};
pub use config::LoanAccountServiceConfig;
pub use facade::{AccountLedgerFacade, InMemoryAccountLedgerFacade, InMemoryLoanAccountFacade, LoanAccountFacade};
pub use fixtures::{InMemoryBackend, SeedData};
pub use postgres::{PostgresAccountLedgerFacade, PostgresLoanAccountFacade};
pub use processor::{
    spawn_worker, InlineLoanAccountProcessor, LoanAccountActivator, LoanAccountProcessor, QueuedLoanAccountProcessor,
};
pub use service::{Collaborators, LoanAccountService, LOAN_ACCOUNT_PREFIX};
