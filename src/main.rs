use chrono::{Days, Utc};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    ing::{IngClient, StaticToken},
    lunchmoney::LunchMoneyClient,
    pipeline::{AccountMap, SyncPolicy},
};

pub mod config;
pub mod error;
pub mod ing;
pub mod lunchmoney;
pub mod pipeline;
pub mod sync;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new().expect("config");

    let accounts = AccountMap::from_env();
    if accounts.is_empty() {
        tracing::warn!("no ACCOUNT_* mappings configured, every row will be dropped");
    }

    let policy = SyncPolicy {
        sync_start_date: config.sync_start_date,
        require_receipt: config.require_receipt,
        amount_precedence: config.amount_precedence,
        transfer_exclusion: config.transfer_exclusion,
        cashback_labels: config.cashback_labels.clone(),
    };

    let since = Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(config.search_days as u64))
        .expect("search window start");

    let tokens = StaticToken::new(config.auth_token.clone());
    let exporter = IngClient::new(config.ing_export_url.clone()).expect("export client");
    let ledger =
        LunchMoneyClient::new(config.lunchmoney_url.clone(), config.api_key.clone())
            .expect("ledger client");

    let outcome = sync::run(&tokens, &exporter, &ledger, &accounts, &policy, since).await;

    println!(
        "{}",
        serde_json::to_string(&outcome).expect("outcome json")
    );

    if !outcome.success {
        std::process::exit(1);
    }
}
