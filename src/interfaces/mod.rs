//! Input and output formats: JSON ledgers, CSV expense imports and CSV
//! balance reports.

pub mod csv;
pub mod ledger;
