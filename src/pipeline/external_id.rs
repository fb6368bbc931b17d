use std::collections::HashMap;

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

// stands in for the receipt number on receiptless rows
const NO_RECEIPT: &str = "0000000000";

const FINGERPRINT_LEN: usize = 10;

/// Per-run sequence numbers for same-day receiptless repeats, keyed by date.
#[derive(Default)]
pub struct CashbackCounter {
    seen: HashMap<NaiveDate, u32>,
}

impl CashbackCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self, date: NaiveDate) -> u32 {
        let count = self.seen.entry(date).or_insert(0);
        *count += 1;

        *count
    }
}

/// Short content hash of the raw payee line, before any cleaning.
pub fn fingerprint(raw_payee: &str) -> String {
    let digest = Sha256::digest(raw_payee.as_bytes());

    hex::encode(digest)[..FINGERPRINT_LEN].to_owned()
}

/// Derives the ledger deduplication key for one transaction.
///
/// The receipt number (or the all-zero placeholder) plus the payee
/// fingerprint is stable across runs, so resubmitting the same export is
/// idempotent. Known repeating receiptless rows, such as recurring cashback
/// credits, land on the same base id within one day; those get the date and
/// a per-date sequence number appended so each occurrence stays distinct.
pub fn derive(
    raw_payee: &str,
    receipt: Option<&str>,
    date: NaiveDate,
    is_cashback: bool,
    counter: &mut CashbackCounter,
) -> String {
    let base = receipt.unwrap_or(NO_RECEIPT);
    let mut external_id = format!("{base}_{hash}", hash = fingerprint(raw_payee));

    if is_cashback {
        let sequence = counter.next(date);
        external_id.push_str(&format!(
            "_{day}_{sequence}",
            day = date.format("%Y%m%d")
        ));
    }

    external_id
}
