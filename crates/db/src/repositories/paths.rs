//! Document layout of one society.
//!
//! ```text
//! organizations/{org}
//!   transactions/{voucher}
//!   counters/voucherNumber
//!   ledgerAccounts/{account}
//!   ledgerBalances/{group|account}
//!     entries/{YYYY-MM-DD}
//!   flats/{flat}
//!     series/{currentBalance|deposit}
//!       entries/{YYYY-MM-DD}
//!     bills/{bill}
//!     unclearedBalances/{transaction}
//! ```

use chrono::NaiveDate;
use society_core::ledger::FlatSeries;
use society_shared::types::{BillId, FlatId, OrganizationId, TransactionId, VoucherId};

use crate::store::{CollectionPath, DocPath};

/// Collection name of uncleared balance records, used for collection-group
/// queries.
pub const UNCLEARED_BALANCES: &str = "unclearedBalances";

/// Collection name of dated series entries.
pub const ENTRIES: &str = "entries";

/// Organization document.
#[must_use]
pub fn organization(org: &OrganizationId) -> DocPath {
    CollectionPath::root("organizations").doc(org.as_str())
}

/// Voucher collection.
#[must_use]
pub fn vouchers(org: &OrganizationId) -> CollectionPath {
    organization(org).collection("transactions")
}

/// Voucher document.
#[must_use]
pub fn voucher(org: &OrganizationId, id: &VoucherId) -> DocPath {
    vouchers(org).doc(id.as_str())
}

/// Per-organization voucher number counter.
#[must_use]
pub fn voucher_counter(org: &OrganizationId) -> DocPath {
    organization(org).collection("counters").doc("voucherNumber")
}

/// Ledger account collection.
#[must_use]
pub fn ledger_accounts(org: &OrganizationId) -> CollectionPath {
    organization(org).collection("ledgerAccounts")
}

/// Key of one ledger account balance series.
///
/// `|` separates group and account; `%` and `|` inside names are encoded.
#[must_use]
pub fn ledger_key(group: &str, account: &str) -> String {
    let encode = |s: &str| s.replace('%', "%25").replace('|', "%7C");
    format!("{}|{}", encode(group), encode(account))
}

/// Head document of a ledger account balance series.
#[must_use]
pub fn ledger_balance(org: &OrganizationId, group: &str, account: &str) -> DocPath {
    organization(org)
        .collection("ledgerBalances")
        .doc(&ledger_key(group, account))
}

/// Flat document.
#[must_use]
pub fn flat(org: &OrganizationId, flat: &FlatId) -> DocPath {
    organization(org).collection("flats").doc(flat.as_str())
}

/// Head document of a flat balance series.
#[must_use]
pub fn flat_series(org: &OrganizationId, flat_id: &FlatId, series: FlatSeries) -> DocPath {
    flat(org, flat_id).collection("series").doc(series.collection())
}

/// Entry collection under a series head.
#[must_use]
pub fn series_entries(head: &DocPath) -> CollectionPath {
    head.collection(ENTRIES)
}

/// Entry document id for a date.
#[must_use]
pub fn entry_id(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Bill collection of a flat.
#[must_use]
pub fn bills(org: &OrganizationId, flat_id: &FlatId) -> CollectionPath {
    flat(org, flat_id).collection("bills")
}

/// Bill document.
#[must_use]
pub fn bill(org: &OrganizationId, flat_id: &FlatId, bill: &BillId) -> DocPath {
    bills(org, flat_id).doc(bill.as_str())
}

/// Uncleared balance collection of a flat.
#[must_use]
pub fn uncleared_balances(org: &OrganizationId, flat_id: &FlatId) -> CollectionPath {
    flat(org, flat_id).collection(UNCLEARED_BALANCES)
}

/// Uncleared balance document.
#[must_use]
pub fn uncleared_balance(org: &OrganizationId, flat_id: &FlatId, txn: &TransactionId) -> DocPath {
    uncleared_balances(org, flat_id).doc(txn.as_str())
}
