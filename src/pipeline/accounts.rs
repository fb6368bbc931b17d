use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static ACCOUNT_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ACCOUNT_([0-9]+)$").expect("account var regex"));

/// Maps bank account numbers to ledger asset ids. Rows whose account is not
/// in the map never become transactions.
pub struct AccountMap {
    accounts: HashMap<String, String>,
}

impl AccountMap {
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            accounts: pairs.into_iter().collect(),
        }
    }

    /// Builds the map from `ACCOUNT_<number>=<asset_id>` environment variables.
    pub fn from_env() -> Self {
        let pairs = std::env::vars().filter_map(|(name, value)| {
            let captures = ACCOUNT_VAR.captures(&name)?;

            Some((captures[1].to_owned(), value))
        });

        Self::new(pairs)
    }

    pub fn resolve(&self, account: &str) -> Option<&str> {
        self.accounts.get(account).map(|asset_id| asset_id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
