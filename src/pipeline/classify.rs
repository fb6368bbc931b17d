use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{AmountPrecedence, RawRow, SyncPolicy, TransferExclusion, accounts::AccountMap};

static SIGNED_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("amount regex"));

pub struct ClassifiedRow {
    pub date: NaiveDate,
    pub asset_id: String,
    pub amount: String,
}

/// Converts the bank's day/month/year date to ISO by reversing the components.
pub fn to_iso_date(source: &str) -> String {
    source.rsplit('/').collect::<Vec<_>>().join("-")
}

/// Decides whether a raw row becomes a transaction and picks its signed
/// amount. Any failing rule drops the row, there is no row-level error.
pub fn classify(row: &RawRow, accounts: &AccountMap, policy: &SyncPolicy) -> Option<ClassifiedRow> {
    let iso = to_iso_date(row.date);
    let date = match NaiveDate::parse_from_str(&iso, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            debug!("dropping row with unparseable date {:?}", row.date);
            return None;
        }
    };

    if date < policy.sync_start_date {
        debug!("dropping row dated {date} before cutoff");
        return None;
    }

    let Some(asset_id) = accounts.resolve(row.account) else {
        debug!("dropping row for unmapped account {:?}", row.account);
        return None;
    };

    // transfers between own accounts are never submitted
    if policy.transfer_exclusion == TransferExclusion::PreFilter
        && row.payee.contains("Internal Transfer")
    {
        debug!("dropping internal transfer row");
        return None;
    }

    let (preferred, fallback) = match policy.amount_precedence {
        AmountPrecedence::CreditFirst => (row.credit, row.debit),
        AmountPrecedence::DebitFirst => (row.debit, row.credit),
    };
    let amount = if preferred.is_empty() { fallback } else { preferred };

    if !SIGNED_DECIMAL.is_match(amount) {
        debug!("dropping row without a numeric amount");
        return None;
    }

    Some(ClassifiedRow {
        date,
        asset_id: asset_id.to_owned(),
        amount: amount.to_owned(),
    })
}
