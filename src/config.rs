use anyhow::Context;
use chrono::NaiveDate;
use dotenv::dotenv;
use serde::Deserialize;

use crate::pipeline::{AmountPrecedence, TransferExclusion};

#[derive(Deserialize)]
pub struct Config {
    pub auth_token: String,
    pub api_key: String,

    #[serde(default = "default_search_days")]
    pub search_days: u32,

    // financial-year cutoff, rows dated before this are dropped
    #[serde(default = "default_sync_start_date")]
    pub sync_start_date: NaiveDate,

    #[serde(default)]
    pub require_receipt: bool,

    #[serde(default)]
    pub amount_precedence: AmountPrecedence,

    #[serde(default)]
    pub transfer_exclusion: TransferExclusion,

    #[serde(default, deserialize_with = "comma_separated")]
    pub cashback_labels: Vec<String>,

    #[serde(default = "default_ing_export_url")]
    pub ing_export_url: String,

    #[serde(default = "default_lunchmoney_url")]
    pub lunchmoney_url: String,
}

impl Config {
    pub fn new() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        let envs = envy::from_env::<Self>().context("invalid environment variables")?;

        return Ok(envs);
    }
}

fn default_search_days() -> u32 {
    30
}

fn default_sync_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 7, 1).expect("valid cutoff date")
}

fn default_ing_export_url() -> String {
    "https://www.ing.com.au/api/ExportTransactions/Service/ExportTransactionsService.svc/json/ExportTransactions/ExportTransactions".to_owned()
}

fn default_lunchmoney_url() -> String {
    "https://dev.lunchmoney.app".to_owned()
}

fn comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;

    Ok(s.split(',')
        .map(|label| label.trim().to_owned())
        .filter(|label| !label.is_empty())
        .collect())
}
