use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::{Client, ClientBuilder};

pub trait TokenProvider {
    async fn login(&self) -> Result<String>;
}

/// The browser-driven login flow runs outside this process; the session token
/// it produced is handed in through configuration.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticToken {
    async fn login(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(anyhow!("no auth token configured"));
        }

        Ok(self.token.to_owned())
    }
}

pub trait ExportFetcher {
    async fn fetch(&self, token: &str, since: NaiveDate) -> Result<String>;
}

pub struct IngClient {
    client: Client,
    export_url: String,
}

impl IngClient {
    pub fn new(export_url: String) -> Result<Self> {
        let client = ClientBuilder::new()
            .build()
            .context("error creating client")?;

        Ok(Self { client, export_url })
    }
}

impl ExportFetcher for IngClient {
    /// Requests the transaction CSV for personal accounts from `since`
    /// onwards. The endpoint takes a form-encoded query and answers with the
    /// raw CSV document, header line first.
    async fn fetch(&self, token: &str, since: NaiveDate) -> Result<String> {
        let start = format!("{since}T00:00:00+0000");

        let res = self
            .client
            .post(&self.export_url)
            .form(&[
                ("X-AuthToken", token),
                ("AccountNumber", ""),
                ("Format", "csv"),
                ("FilterStartDate", start.as_str()),
                ("FilterEndDate", ""),
                ("FilterMinValue", ""),
                ("FilterMaxValue", ""),
                ("FilterProductTransactionTypeId", ""),
                ("SearchQuery", ""),
                ("ReturnPersonalTransactions", "true"),
                ("ReturnBusinessTransactions", "false"),
                ("IsSpecific", ""),
            ])
            .send()
            .await
            .context("error making export req")?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow!("export req error {text} {status}"));
        }

        let csv = res.text().await.context("error reading export res")?;

        Ok(csv)
    }
}
