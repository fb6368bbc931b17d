use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod accounts;
pub mod classify;
pub mod external_id;
pub mod payee;

pub use accounts::AccountMap;
use external_id::CashbackCounter;

/// One record of the bank's CSV export, in column order.
pub struct RawRow<'a> {
    pub date: &'a str,
    pub account: &'a str,
    pub payee: &'a str,
    pub credit: &'a str,
    pub debit: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTransaction {
    pub date: NaiveDate,
    pub amount: String,
    pub payee: String,
    pub asset_id: String,
    pub external_id: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountPrecedence {
    #[default]
    CreditFirst,
    DebitFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferExclusion {
    #[default]
    PreFilter,
    BoilerplateStrip,
}

/// The switches between the two historical pipeline flavors. One pipeline,
/// configured, instead of two near-duplicate code paths.
pub struct SyncPolicy {
    pub sync_start_date: NaiveDate,
    pub require_receipt: bool,
    pub amount_precedence: AmountPrecedence,
    pub transfer_exclusion: TransferExclusion,
    pub cashback_labels: Vec<String>,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            sync_start_date: NaiveDate::from_ymd_opt(2021, 7, 1).expect("valid cutoff date"),
            require_receipt: false,
            amount_precedence: AmountPrecedence::default(),
            transfer_exclusion: TransferExclusion::default(),
            cashback_labels: vec![],
        }
    }
}

/// Runs every export row through filtering, account mapping, payee cleanup
/// and id derivation. The export arrives newest-first; the returned batch is
/// reversed into chronological order for submission. Rows are processed in
/// input order so the cashback sequence numbers are deterministic.
pub fn build_batch(
    csv_text: &str,
    accounts: &AccountMap,
    policy: &SyncPolicy,
) -> Result<Vec<NormalizedTransaction>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let mut counter = CashbackCounter::new();
    let mut batch = Vec::new();

    for result in reader.records() {
        let record = result.context("error reading export record")?;

        let row = RawRow {
            date: record.get(0).unwrap_or(""),
            account: record.get(1).unwrap_or(""),
            payee: record.get(2).unwrap_or(""),
            credit: record.get(3).unwrap_or(""),
            debit: record.get(4).unwrap_or(""),
        };

        let Some(classified) = classify::classify(&row, accounts, policy) else {
            continue;
        };

        let strip_transfer_marker =
            policy.transfer_exclusion == TransferExclusion::BoilerplateStrip;

        if strip_transfer_marker && row.payee.contains("Internal Transfer") {
            debug!("dropping internal transfer row");
            continue;
        }

        let fields = payee::normalize(row.payee, strip_transfer_marker);

        if policy.require_receipt && fields.receipt.is_none() {
            debug!("dropping receiptless row {:?}", fields.cleaned);
            continue;
        }

        let is_cashback = fields.receipt.is_none()
            && policy
                .cashback_labels
                .iter()
                .any(|label| label == &fields.cleaned);

        let external_id = external_id::derive(
            row.payee,
            fields.receipt.as_deref(),
            classified.date,
            is_cashback,
            &mut counter,
        );

        let tags = fields
            .card_suffix
            .map(|suffix| vec![format!("card-{suffix}")])
            .unwrap_or_default();

        batch.push(NormalizedTransaction {
            date: classified.date,
            amount: classified.amount,
            payee: fields.cleaned,
            asset_id: classified.asset_id,
            external_id,
            tags,
        });
    }

    // export is newest-first, the ledger wants oldest-first
    batch.reverse();

    Ok(batch)
}
