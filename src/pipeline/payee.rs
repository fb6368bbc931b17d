use once_cell::sync::Lazy;
use regex::Regex;

static RECEIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Receipt ([0-9]+)").expect("receipt regex"));

static CARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Card [0-9x]{12}([0-9]{4})").expect("card regex"));

static FILLER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[- ]+").expect("filler regex"));

const BOILERPLATE: &[&str] = &["Visa Purchase", "EFTPOS Purchase", "Direct Debit"];

pub struct PayeeFields {
    pub cleaned: String,
    pub receipt: Option<String>,
    pub card_suffix: Option<String>,
}

pub fn is_direct_debit(raw: &str) -> bool {
    raw.contains("Direct Debit")
}

/// Cleans a raw payee line and pulls out the receipt number and card suffix.
///
/// Direct debits keep the text after the receipt token since the bank puts
/// the actual description there; everything else is truncated at the receipt.
/// When `strip_transfer_marker` is set the `Internal Transfer` boilerplate is
/// removed here as well (the row itself is rejected by the classifier).
pub fn normalize(raw: &str, strip_transfer_marker: bool) -> PayeeFields {
    let receipt_match = RECEIPT.find(raw);
    let receipt = RECEIPT
        .captures(raw)
        .map(|captures| captures[1].to_owned());

    let card_suffix = CARD.captures(raw).map(|captures| captures[1].to_owned());

    let mut payee = match receipt_match {
        Some(found) if !is_direct_debit(raw) => raw[..found.start()].to_owned(),
        _ => raw.to_owned(),
    };

    for boilerplate in BOILERPLATE {
        payee = payee.replacen(boilerplate, "", 1);
    }

    if strip_transfer_marker {
        payee = payee.replacen("Internal Transfer", "", 1);
    }

    if let Some(found) = receipt_match {
        payee = payee.replacen(found.as_str(), "", 1);
    }

    let cleaned = FILLER.replace_all(&payee, " ").trim().to_owned();

    PayeeFields {
        cleaned,
        receipt,
        card_suffix,
    }
}
