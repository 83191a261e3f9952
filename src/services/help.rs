// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Parser help texts shown next to the upload forms.

use std::sync::LazyLock;

/// Reply for keys without help text.
pub const NO_HELP: &str = "No help text available for this parser.";

const MDB: &str = "OVERVIEW
The MDB parser reads Midland Bank statements and stores their transactions for reconciliation.

KEY FEATURES
- Reads MDB statements converted to Excel (.xlsx)
- Drops repeated headers, totals and other non-transaction rows
- Picks up the account number and statement period from the statement heading
- Gives every transaction a unique ID
- Derives a vendor name from the narration for Bank-Fin matching

HOW TO USE
- Open the Bank Parser tab.
- Select 'Midland Bank' as the bank.
- Upload the statement (.xlsx) and click 'Parse'.
";

const MTB: &str = "OVERVIEW
The MTB parser reads Mutual Trust Bank statements and stores their transactions for reconciliation.

KEY FEATURES
- Reads MTB statements in Excel format (.xls)
- Cleans and standardizes transaction rows
- Picks up the account number and statement period
- Gives every transaction a unique ID
- Derives a vendor name for Bank-Fin matching

HOW TO USE
- Open the Bank Parser tab.
- Select 'Mutual Trust Bank' as the bank.
- Upload the statement (.xls) and click 'Parse'.
";

const PBL: &str = "OVERVIEW
The PBL parser reads Prime Bank statements and stores their transactions for reconciliation.

KEY FEATURES
- Reads Prime Bank statements in Excel format (.xlsx)
- Cleans and standardizes transaction rows
- Picks up the account number and statement period
- Gives every transaction a unique ID
- Derives a vendor name for Bank-Fin matching

HOW TO USE
- Open the Bank Parser tab.
- Select 'Prime Bank' as the bank.
- Upload the statement (.xlsx) and click 'Parse'.
";

const AIBL: &str = "*Help text for AIBL will be added soon.*";
const OBL: &str = "*Help text for OBL will be added soon.*";

const TALLY: &str = "OVERVIEW
The Tally parser reads ledger exports from Tally and stores their vouchers for Bank-Tally and Bank-Fin-Tally reconciliation.

KEY FEATURES
- Reads Tally ledger exports (.xlsx, .xls)
- Takes the bank and account from the ledger heading
- Drops opening and closing balance rows
- Normalizes particulars and extracts a vendor name
- Gives every voucher a unique ID

HOW TO USE
- Open the Tally Parser tab.
- Upload the ledger export and enter the worksheet name.
- Click 'Parse'.

SUPPORT
- Contact your IT department for questions or assistance.
";

const FIN: &str = "OVERVIEW
The Finance Paid List parser reads paid lists and stores each payment for Bank-Fin reconciliation.

KEY FEATURES
- Reads finance paid list workbooks (.xlsx)
- Cleans amounts, dates and voucher numbers
- Assigns each payment to its bank and sender account
- Gives every payment a unique ID
- Derives a vendor name from the receiver for matching

HOW TO USE
- Open the Finance Parser tab.
- Upload the paid list and enter the worksheet name.
- Click 'Parse'.

SUPPORT
- Contact your IT department for questions or assistance.
";

static BANK: LazyLock<String> = LazyLock::new(|| {
    format!(
        "==== Midland Bank (MDB) Parser ====\n{MDB}\n\
         ==== Mutual Trust Bank (MTB) Parser ====\n{MTB}\n\
         ==== Prime Bank (PBL) Parser ====\n{PBL}\n\
         ==== AIBL Parser ====\n{AIBL}\n\n\
         ==== OBL Parser ====\n{OBL}\n\n\
         SUPPORT\nIf you have questions or require technical support, contact your IT department.\n"
    )
});

/// Help text for `key` (case-insensitive).
pub fn help_text(key: &str) -> &'static str {
    match key.to_ascii_uppercase().as_str() {
        "MDB" => MDB,
        "MTB" => MTB,
        "PBL" => PBL,
        "AIBL" => AIBL,
        "OBL" => OBL,
        "BANK" => BANK.as_str(),
        "TALLY" => TALLY,
        "FIN" => FIN,
        _ => NO_HELP,
    }
}
