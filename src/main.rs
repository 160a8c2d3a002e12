use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sandbank::assistant::AssistantRelay;
use sandbank::config::{default_config_path, Config};
use sandbank::feed::{
    classify, classify_by_sign, signed_amount, Categorizer, FeedController, FeedEntry, RefreshMode,
    RefreshOutcome,
};
use sandbank::format::{format_signed_amount, human_date};
use sandbank::ledger::{Ledger, LedgerClient};
use sandbank::models::{AccountId, UnifiedTransaction};
use sandbank::submit::{parse_amount, resolve_merchant, Submitter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sandbank")]
#[command(about = "Banking sandbox client: transaction feed, payments and transfers")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the merged purchase/transfer feed
    Feed {
        /// Account to show (defaults to ledger.default_account_id)
        #[arg(long)]
        account: Option<String>,

        /// Number of pages to reveal
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Print visible entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pay a service (purchase) or a credit card (transfer)
    Pay {
        /// Service key from the merchant catalog (e.g. internet)
        #[arg(long, conflicts_with = "card", required_unless_present = "card")]
        service: Option<String>,

        /// Credit card account id to pay
        #[arg(long)]
        card: Option<String>,

        #[arg(long)]
        amount: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Paying account (defaults to ledger.default_account_id)
        #[arg(long)]
        account: Option<String>,
    },

    /// Transfer money to another account
    Transfer {
        /// Payee account id (24 hex characters)
        #[arg(long)]
        payee: String,

        #[arg(long)]
        amount: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Paying account (defaults to ledger.default_account_id)
        #[arg(long)]
        account: Option<String>,

        /// Skip the account existence checks
        #[arg(long)]
        no_preflight: bool,
    },

    /// Show one transaction from a JSON payload
    Detail {
        payload: String,

        /// Reference account for direction
        #[arg(long)]
        account: Option<String>,
    },

    /// Ask the banking assistant
    Ask { message: String },

    /// Show current configuration
    Config,
}

fn reference_account(config: &Config, flag: Option<&str>) -> Result<AccountId> {
    flag.map(|id| AccountId::from_string(id.trim()))
        .or_else(|| config.ledger.default_account_id.clone())
        .context("No account given: pass --account or set ledger.default_account_id")
}

fn ledger(config: &Config) -> Result<Arc<dyn Ledger>> {
    let client = LedgerClient::from_config(&config.ledger)?;
    Ok(Arc::new(client))
}

fn print_entry(entry: &FeedEntry) {
    let tx = &entry.transaction;
    println!(
        "{:<12} {:>14}  {:<11} {:<13} {}",
        human_date(&tx.occurred_on),
        format_signed_amount(tx.amount, entry.classification.direction),
        entry.classification.status.label,
        entry.category.as_str(),
        tx.display_description()
    );
}

async fn run_feed(config: &Config, account: Option<&str>, pages: usize, json: bool) -> Result<()> {
    let account_id = reference_account(config, account)?;
    let categorizer = Categorizer::from_rules(&config.categories)?;
    let controller = FeedController::new(ledger(config)?, account_id)
        .with_categorizer(categorizer)
        .with_page_size(config.feed.page_size);

    if let RefreshOutcome::Failed { message, .. } = controller.refresh(RefreshMode::Focus).await {
        anyhow::bail!("Could not load transactions: {message}");
    }
    for _ in 1..pages.max(1) {
        controller.load_more();
    }

    let state = controller.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(state.visible())?);
        return Ok(());
    }

    if let Some(account) = &state.account {
        println!("Balance: {}", sandbank::format::format_money(account.balance));
    }
    for entry in state.visible() {
        print_entry(entry);
    }
    if state.has_more() {
        let remaining = state.entries.len() - state.visible().len();
        println!("... {remaining} more (use --pages to load more)");
    }
    Ok(())
}

fn print_detail(payload: &str, account: Option<&AccountId>) -> Result<()> {
    let tx = UnifiedTransaction::from_payload(payload).context("Could not load transaction")?;
    let c = match account {
        Some(reference) => classify(&tx, reference),
        None => classify_by_sign(&tx),
    };
    let category = Categorizer::builtin().categorize(tx.display_description());

    println!("{}", tx.display_description());
    println!("  Type:      {}", tx.kind.as_str());
    println!("  Amount:    {}", format_signed_amount(tx.amount, c.direction));
    println!("  Signed:    {}", signed_amount(tx.amount, c.direction));
    println!("  Status:    {} ({})", c.status.label, c.status.tone.hex());
    println!("  Date:      {}", human_date(&tx.occurred_on));
    println!("  Reference: {}", tx.id);
    println!("  Category:  {}", category.as_str());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?
        .with_env_overrides();

    match cli.command {
        Command::Feed {
            account,
            pages,
            json,
        } => run_feed(&config, account.as_deref(), pages, json).await?,
        Command::Pay {
            service,
            card,
            amount,
            description,
            account,
        } => {
            let payer = reference_account(&config, account.as_deref())?;
            let amount = parse_amount(&amount).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let submitter = Submitter::new(ledger(&config)?).with_preflight(false);
            let created = match (service, card) {
                (Some(service), _) => {
                    let merchant = resolve_merchant(&config.merchants, &service)
                        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                    submitter
                        .submit_purchase(&payer, &merchant, amount, &description)
                        .await
                }
                (None, Some(card)) => {
                    submitter
                        .submit_transfer(&payer, &card, amount, &description)
                        .await
                }
                (None, None) => anyhow::bail!("Pass --service or --card"),
            };
            let id = created.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Payment sent. Folio: {id}");
        }
        Command::Transfer {
            payee,
            amount,
            description,
            account,
            no_preflight,
        } => {
            let payer = reference_account(&config, account.as_deref())?;
            let amount = parse_amount(&amount).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let id = Submitter::new(ledger(&config)?)
                .with_preflight(!no_preflight)
                .submit_transfer(&payer, &payee, amount, &description)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Transfer sent. Transaction id: {id}");
        }
        Command::Detail { payload, account } => {
            let account = account.map(|id| AccountId::from_string(id.trim()));
            print_detail(
                &payload,
                account.as_ref().or(config.ledger.default_account_id.as_ref()),
            )?;
        }
        Command::Ask { message } => {
            let relay = AssistantRelay::from_config(&config.assistant);
            let reply = relay
                .forward(&message)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{reply}");
        }
        Command::Config => {
            println!("Config file: {}", config_path.display());
            println!("Ledger URL: {}", config.ledger.base_url);
            println!(
                "Ledger API key: {}",
                if config.ledger.api_key.is_some() { "set" } else { "not set" }
            );
            match &config.ledger.default_account_id {
                Some(id) => println!("Default account: {id}"),
                None => println!("Default account: not set"),
            }
            println!("Page size: {}", config.feed.page_size);
            println!("Merchants:");
            for (key, id) in &config.merchants {
                println!("  {key:<10} {id}");
            }
            println!("Assistant model: {}", config.assistant.model);
        }
    }

    Ok(())
}
