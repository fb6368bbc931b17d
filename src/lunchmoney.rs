use anyhow::{Context, Result, anyhow};
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::json;

use crate::pipeline::NormalizedTransaction;

pub trait LedgerClient {
    async fn submit(&self, batch: &[NormalizedTransaction]) -> Result<InsertResponse>;
}

#[derive(Debug, Deserialize)]
pub struct InsertResponse {
    pub ids: Option<Vec<i64>>,
    pub error: Option<String>,
}

pub struct LunchMoneyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LunchMoneyClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        let client = ClientBuilder::new()
            .build()
            .context("error creating client")?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

impl LedgerClient for LunchMoneyClient {
    /// Inserts the batch, deduplicated server-side by `external_id` per
    /// asset. Amounts keep the bank's sign (spending is negative), which is
    /// what `debit_as_negative` tells the ledger to expect.
    async fn submit(&self, batch: &[NormalizedTransaction]) -> Result<InsertResponse> {
        let res = self
            .client
            .post(format!("{base}/v1/transactions", base = self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "transactions": batch,
                "debit_as_negative": true,
                "skip_balance_update": true,
            }))
            .send()
            .await
            .context("error making insert req")?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow!("insert req error {text} {status}"));
        }

        let res = res
            .json::<InsertResponse>()
            .await
            .context("error parsing insert res")?;

        Ok(res)
    }
}
