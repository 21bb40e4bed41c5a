//! PostgreSQL facades for loan accounts and ledger associations

use async_trait::async_trait;
use chrono::Utc;
use common::error::{CmsStatusCode, Error, Result};
use common::model::ledger::AccountLedgerEntity;
use common::model::loan_account::{AccountStatus, LoanAccountEntity};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use crate::config::LoanAccountServiceConfig;
use crate::facade::{generate_account_id, AccountLedgerFacade, LoanAccountFacade};

const LOAN_ACCOUNT_COLUMNS: &str = "loan_account_id, customer_profile_id, end_customer_profile_id, product_id, \
     idempotency_key, approved_amount, tenure, interest_rate, country, currency, status, origin, \
     created_at, updated_at";

/// Connect a pool sized from configuration
pub async fn connect_pool(config: &LoanAccountServiceConfig) -> Result<PgPool> {
    info!("Connecting to PostgreSQL database with pool size: {}", config.db_pool_size);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_pool_size)
        .connect(&config.database_url)
        .await
        .map_err(Error::Database)?;

    info!("Connected to PostgreSQL database");
    Ok(pool)
}

/// Create the tables used by the facades if they do not exist
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS loan_accounts (
            loan_account_id TEXT PRIMARY KEY,
            customer_profile_id TEXT NOT NULL,
            end_customer_profile_id TEXT NOT NULL,
            product_id TEXT NOT NULL,
            idempotency_key TEXT NOT NULL,
            approved_amount BIGINT NOT NULL,
            tenure BIGINT NOT NULL,
            interest_rate TEXT NOT NULL,
            country TEXT NOT NULL,
            currency TEXT NOT NULL,
            status TEXT NOT NULL,
            origin TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            UNIQUE (customer_profile_id, idempotency_key)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS account_ledgers (
            account_id TEXT NOT NULL,
            ledger_type TEXT NOT NULL,
            ledger_id TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (account_id, ledger_type)
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn loan_account_from_row(row: &PgRow) -> Result<LoanAccountEntity> {
    let interest_rate: String = row.get("interest_rate");
    let currency: String = row.get("currency");
    let status: String = row.get("status");
    let origin: String = row.get("origin");

    Ok(LoanAccountEntity {
        loan_account_id: row.get("loan_account_id"),
        customer_profile_id: row.get("customer_profile_id"),
        end_customer_profile_id: row.get("end_customer_profile_id"),
        product_id: row.get("product_id"),
        idempotency_key: row.get("idempotency_key"),
        approved_amount: row.get("approved_amount"),
        tenure: row.get("tenure"),
        interest_rate: interest_rate
            .parse()
            .map_err(|e| Error::Internal(format!("Invalid interest rate format: {}", e)))?,
        country: row.get("country"),
        currency: currency.parse()?,
        status: status.parse()?,
        origin: origin.parse()?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// PostgreSQL loan account storage
pub struct PostgresLoanAccountFacade {
    pool: PgPool,
}

impl PostgresLoanAccountFacade {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanAccountFacade for PostgresLoanAccountFacade {
    async fn get_account_by_idempotency_key(
        &self,
        customer_profile_id: &str,
        idempotency_key: &str,
    ) -> Result<Option<LoanAccountEntity>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM loan_accounts WHERE customer_profile_id = $1 AND idempotency_key = $2",
            LOAN_ACCOUNT_COLUMNS
        ))
        .bind(customer_profile_id)
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(loan_account_from_row).transpose()
    }

    async fn create_loan_account(&self, mut entity: LoanAccountEntity, prefix: &str) -> Result<LoanAccountEntity> {
        let now = Utc::now();
        entity.loan_account_id = generate_account_id(prefix);
        entity.created_at = now;
        entity.updated_at = now;

        debug!("Inserting loan account {}", entity.loan_account_id);

        let result = sqlx::query(&format!(
            "INSERT INTO loan_accounts ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            LOAN_ACCOUNT_COLUMNS
        ))
        .bind(&entity.loan_account_id)
        .bind(&entity.customer_profile_id)
        .bind(&entity.end_customer_profile_id)
        .bind(&entity.product_id)
        .bind(&entity.idempotency_key)
        .bind(entity.approved_amount)
        .bind(entity.tenure)
        .bind(entity.interest_rate.to_string())
        .bind(&entity.country)
        .bind(entity.currency.as_str())
        .bind(entity.status.as_str())
        .bind(entity.origin.as_str())
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(entity),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(Error::bad_request(CmsStatusCode::DuplicateIdempotencyKey))
            }
            Err(e) => Err(Error::Database(e)),
        }
    }

    async fn get_loan_account_by_account_id(&self, loan_account_id: &str) -> Result<Option<LoanAccountEntity>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM loan_accounts WHERE loan_account_id = $1",
            LOAN_ACCOUNT_COLUMNS
        ))
        .bind(loan_account_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(loan_account_from_row).transpose()
    }

    async fn update_account_status(&self, loan_account_id: &str, status: AccountStatus) -> Result<LoanAccountEntity> {
        let row = sqlx::query(&format!(
            "UPDATE loan_accounts SET status = $2, updated_at = $3 WHERE loan_account_id = $1 RETURNING {}",
            LOAN_ACCOUNT_COLUMNS
        ))
        .bind(loan_account_id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::bad_request(CmsStatusCode::LoanAccountNotFound))?;

        loan_account_from_row(&row)
    }
}

/// PostgreSQL ledger association storage
pub struct PostgresAccountLedgerFacade {
    pool: PgPool,
}

impl PostgresAccountLedgerFacade {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountLedgerFacade for PostgresAccountLedgerFacade {
    async fn list_account_ledgers_by_account_id(&self, account_id: &str) -> Result<Vec<AccountLedgerEntity>> {
        let rows = sqlx::query(
            "SELECT account_id, ledger_type, ledger_id FROM account_ledgers
             WHERE account_id = $1
             ORDER BY created_at, ledger_type",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        let mut ledgers = Vec::with_capacity(rows.len());
        for row in rows {
            let ledger_type: String = row.get("ledger_type");
            ledgers.push(AccountLedgerEntity {
                account_id: row.get("account_id"),
                ledger_type: ledger_type.parse()?,
                ledger_id: row.get("ledger_id"),
            });
        }

        Ok(ledgers)
    }

    async fn save_account_ledger(&self, entity: AccountLedgerEntity) -> Result<AccountLedgerEntity> {
        sqlx::query(
            "INSERT INTO account_ledgers (account_id, ledger_type, ledger_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (account_id, ledger_type)
             DO UPDATE SET ledger_id = $3",
        )
        .bind(&entity.account_id)
        .bind(entity.ledger_type.as_str())
        .bind(&entity.ledger_id)
        .execute(&self.pool)
        .await?;

        Ok(entity)
    }
}
