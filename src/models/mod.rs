// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod bank;
pub mod filters;
pub mod finance;
pub mod matched;
pub mod tally;

pub use bank::{BankEntry, BankRecord};
pub use filters::{DataTableFilter, ReportFilter, ReportScope};
pub use finance::{FinanceEntry, FinanceRecord};
pub use matched::{BfMatchedRow, BftMatchedRow, BtMatchedRow, MatchSource};
pub use tally::{TallyEntry, TallyRecord};
