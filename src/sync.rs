use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info};

use crate::{
    error::SyncError,
    ing::{ExportFetcher, TokenProvider},
    lunchmoney::LedgerClient,
    pipeline::{self, AccountMap, SyncPolicy},
};

/// What one sync run reports back. `inserted` is the number of ids the
/// ledger returned, which is only equal to the submitted count when the
/// ledger hands out one id per row.
#[derive(Debug, Serialize)]
pub struct SyncOutcome {
    pub success: bool,
    pub inserted: Option<usize>,
    pub error: Option<String>,
}

/// Runs one full sync: login, export fetch, normalization, batch submit.
/// All-or-nothing; any failure discards the whole batch and lands in the
/// outcome's error field.
pub async fn run(
    tokens: &impl TokenProvider,
    exporter: &impl ExportFetcher,
    ledger: &impl LedgerClient,
    accounts: &AccountMap,
    policy: &SyncPolicy,
    since: NaiveDate,
) -> SyncOutcome {
    match run_inner(tokens, exporter, ledger, accounts, policy, since).await {
        Ok(inserted) => SyncOutcome {
            success: true,
            inserted: Some(inserted),
            error: None,
        },
        Err(err) => {
            error!("sync failed: {err}");

            SyncOutcome {
                success: false,
                inserted: None,
                error: Some(err.to_string()),
            }
        }
    }
}

async fn run_inner(
    tokens: &impl TokenProvider,
    exporter: &impl ExportFetcher,
    ledger: &impl LedgerClient,
    accounts: &AccountMap,
    policy: &SyncPolicy,
    since: NaiveDate,
) -> Result<usize, SyncError> {
    let token = tokens
        .login()
        .await
        .map_err(|err| SyncError::Login(err.to_string()))?;

    let csv = exporter
        .fetch(&token, since)
        .await
        .map_err(|err| SyncError::Export(err.to_string()))?;

    let batch = pipeline::build_batch(&csv, accounts, policy)?;

    if batch.is_empty() {
        info!("no transactions to submit");
        return Ok(0);
    }

    info!("submitting {} transactions", batch.len());

    let res = ledger
        .submit(&batch)
        .await
        .map_err(|err| SyncError::Ledger(err.to_string()))?;

    if let Some(error) = res.error {
        return Err(SyncError::Ledger(error));
    }

    let inserted = res.ids.map(|ids| ids.len()).unwrap_or(0);
    info!("ledger returned {inserted} ids");

    Ok(inserted)
}

#[cfg(test)]
mod test {
    use anyhow::{Result, anyhow};
    use chrono::NaiveDate;

    use super::run;
    use crate::{
        ing::{ExportFetcher, StaticToken, TokenProvider},
        lunchmoney::{InsertResponse, LedgerClient},
        pipeline::{AccountMap, NormalizedTransaction, SyncPolicy},
    };

    const EXPORT: &str = "Date,Account,Description,Credit,Debit\n\
        02/07/2023,123,Visa Purchase Corner Cafe Receipt 2,,-4.50\n\
        01/07/2023,123,Visa Purchase XYZ Store Receipt 1,,-45.00\n";

    struct StubExporter {
        csv: String,
    }

    impl ExportFetcher for StubExporter {
        async fn fetch(&self, _token: &str, _since: NaiveDate) -> Result<String> {
            Ok(self.csv.to_owned())
        }
    }

    struct StubLedger {
        ids: Vec<i64>,
        error: Option<String>,
    }

    impl LedgerClient for StubLedger {
        async fn submit(&self, _batch: &[NormalizedTransaction]) -> Result<InsertResponse> {
            if let Some(error) = &self.error {
                return Ok(InsertResponse {
                    ids: None,
                    error: Some(error.to_owned()),
                });
            }

            Ok(InsertResponse {
                ids: Some(self.ids.to_owned()),
                error: None,
            })
        }
    }

    struct UnreachableLedger;

    impl LedgerClient for UnreachableLedger {
        async fn submit(&self, _batch: &[NormalizedTransaction]) -> Result<InsertResponse> {
            Err(anyhow!("ledger must not be called for an empty batch"))
        }
    }

    struct FailingLogin;

    impl TokenProvider for FailingLogin {
        async fn login(&self) -> Result<String> {
            Err(anyhow!("bad credentials"))
        }
    }

    fn accounts() -> AccountMap {
        AccountMap::new([("123".to_owned(), "A1".to_owned())])
    }

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).expect("since")
    }

    #[tokio::test]
    async fn successful_run_reports_the_ledger_id_count() {
        let exporter = StubExporter {
            csv: EXPORT.to_owned(),
        };
        let ledger = StubLedger {
            ids: vec![101, 102],
            error: None,
        };

        let outcome = run(
            &StaticToken::new("token"),
            &exporter,
            &ledger,
            &accounts(),
            &SyncPolicy::default(),
            since(),
        )
        .await;

        assert!(outcome.success);
        assert_eq!(outcome.inserted, Some(2));
        assert_eq!(outcome.error, None);
    }

    #[tokio::test]
    async fn id_count_may_diverge_from_submitted_count() {
        let exporter = StubExporter {
            csv: EXPORT.to_owned(),
        };
        // one id for two submitted rows, e.g. server-side dedup
        let ledger = StubLedger {
            ids: vec![101],
            error: None,
        };

        let outcome = run(
            &StaticToken::new("token"),
            &exporter,
            &ledger,
            &accounts(),
            &SyncPolicy::default(),
            since(),
        )
        .await;

        assert!(outcome.success);
        assert_eq!(outcome.inserted, Some(1));
    }

    #[tokio::test]
    async fn ledger_error_fails_the_whole_run() {
        let exporter = StubExporter {
            csv: EXPORT.to_owned(),
        };
        let ledger = StubLedger {
            ids: vec![],
            error: Some("asset 41 not found".to_owned()),
        };

        let outcome = run(
            &StaticToken::new("token"),
            &exporter,
            &ledger,
            &accounts(),
            &SyncPolicy::default(),
            since(),
        )
        .await;

        assert!(!outcome.success);
        assert_eq!(outcome.inserted, None);
        assert_eq!(
            outcome.error.as_deref(),
            Some("ledger rejected batch: asset 41 not found")
        );
    }

    #[tokio::test]
    async fn empty_batch_skips_the_ledger_call() {
        let exporter = StubExporter {
            csv: "Date,Account,Description,Credit,Debit\n".to_owned(),
        };

        let outcome = run(
            &StaticToken::new("token"),
            &exporter,
            &UnreachableLedger,
            &accounts(),
            &SyncPolicy::default(),
            since(),
        )
        .await;

        assert!(outcome.success);
        assert_eq!(outcome.inserted, Some(0));
    }

    #[tokio::test]
    async fn login_failure_aborts_before_fetching() {
        let exporter = StubExporter {
            csv: EXPORT.to_owned(),
        };
        let ledger = StubLedger {
            ids: vec![],
            error: None,
        };

        let outcome = run(
            &FailingLogin,
            &exporter,
            &ledger,
            &accounts(),
            &SyncPolicy::default(),
            since(),
        )
        .await;

        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("login failed: bad credentials")
        );
    }
}
