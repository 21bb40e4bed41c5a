use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use common::model::loan_account::{AccountParam, LoanAccountRequest};
use common::model::origin::Origin;
use common::InterestRate;
use loan_account_service::postgres::{connect_pool, ensure_schema};
use loan_account_service::{
    spawn_worker, AccountLedgerFacade, InMemoryBackend, InlineLoanAccountProcessor, LoanAccountActivator,
    LoanAccountFacade, LoanAccountService, LoanAccountServiceConfig, PostgresAccountLedgerFacade,
    PostgresLoanAccountFacade, QueuedLoanAccountProcessor, SeedData,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loan Account Service CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// JSON seed with profiles, products, accounts and ledgers
    #[arg(short, long, global = true)]
    seed: Option<PathBuf>,

    /// Store loan accounts in PostgreSQL instead of memory
    #[arg(short, long, global = true)]
    database_url: Option<String>,

    /// Commands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a loan account, process it and print its balance
    Create {
        /// Customer profile creating the account
        #[arg(long)]
        profile: String,
        /// Idempotency key
        #[arg(long)]
        idempotency_key: String,
        /// Loan product ID
        #[arg(long)]
        product: String,
        /// Borrower profile ID
        #[arg(long)]
        end_customer: String,
        /// Approved amount
        #[arg(long)]
        amount: i64,
        /// Tenure in months
        #[arg(long)]
        tenure: i64,
        /// Annual interest rate in percent
        #[arg(long)]
        rate: InterestRate,
        /// Request origin
        #[arg(long, default_value = "CUSTOMER")]
        origin: Origin,
    },
    /// Print the balance of a loan account
    Balance {
        /// Customer profile owning the account
        #[arg(long)]
        profile: String,
        /// Loan account ID
        #[arg(long)]
        account: String,
        /// Request origin
        #[arg(long, default_value = "CUSTOMER")]
        origin: Origin,
    },
    /// Create the PostgreSQL tables
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "loan_account_service={},common={}",
            cli.log_level, cli.log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = LoanAccountServiceConfig::from_env();
    if let Some(url) = &cli.database_url {
        config.database_url = url.clone();
    }

    if let Commands::Migrate = cli.command {
        let pool = connect_pool(&config).await?;
        ensure_schema(&pool).await?;
        info!("Schema ready");
        return Ok(());
    }

    run(cli, config).await
}

async fn run(cli: Cli, config: LoanAccountServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend = InMemoryBackend::new();
    if let Some(path) = &cli.seed {
        let seed = SeedData::from_file(path)?;
        if cli.database_url.is_some() {
            seed.ensure_no_stored_accounts()?;
        }
        backend.load(&seed).await?;
    }

    let (loan_accounts, account_ledgers): (Arc<dyn LoanAccountFacade>, Arc<dyn AccountLedgerFacade>) =
        match &cli.database_url {
            Some(_) => {
                let pool = connect_pool(&config).await?;
                ensure_schema(&pool).await?;
                (
                    Arc::new(PostgresLoanAccountFacade::new(pool.clone())),
                    Arc::new(PostgresAccountLedgerFacade::new(pool)),
                )
            }
            None => (backend.loan_accounts.clone(), backend.account_ledgers.clone()),
        };

    let activator = Arc::new(LoanAccountActivator::new(
        loan_accounts.clone(),
        account_ledgers.clone(),
        backend.ledger_api.clone(),
    ));

    // Reads never trigger processing
    let reader = LoanAccountService::new(backend.collaborators_with(
        loan_accounts.clone(),
        account_ledgers.clone(),
        Arc::new(InlineLoanAccountProcessor::new(activator.clone())),
    ));

    match cli.command {
        Commands::Create {
            profile,
            idempotency_key,
            product,
            end_customer,
            amount,
            tenure,
            rate,
            origin,
        } => {
            let (processor, queue) = QueuedLoanAccountProcessor::new(config.process_queue_capacity);
            let worker = spawn_worker(queue, activator);
            let service = LoanAccountService::with_prefix(
                backend.collaborators_with(loan_accounts, account_ledgers, Arc::new(processor)),
                config.loan_account_prefix.clone(),
            );

            let request = LoanAccountRequest {
                product_id: product,
                end_customer_profile_id: end_customer,
                account_param: AccountParam {
                    approved_amount: amount,
                    tenure,
                    interest_rate: rate,
                },
            };

            let response = service
                .create_loan_account(&profile, &request, &idempotency_key, origin)
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);

            // Dropping the only processor handle lets the worker drain and exit
            drop(service);
            worker.await?;

            let balance = reader
                .get_account_balance(&profile, &response.account_id, origin)
                .await?;
            println!("{}", serde_json::to_string_pretty(&balance)?);
        }
        Commands::Balance {
            profile,
            account,
            origin,
        } => {
            let balance = reader.get_account_balance(&profile, &account, origin).await?;
            println!("{}", serde_json::to_string_pretty(&balance)?);
        }
        Commands::Migrate => {}
    }

    Ok(())
}
