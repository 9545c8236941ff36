use crate::domain::expense::{Category, NewExpense, equal_split};
use crate::domain::group::GroupId;
use crate::domain::money::Money;
use crate::domain::user::UserId;
use crate::error::{Result, SplitError};
use serde::Deserialize;
use std::io::Read;

/// One CSV row: an expense split equally between `;`-separated members.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ExpenseRow {
    pub group: GroupId,
    pub paid_by: UserId,
    pub amount: Money,
    pub description: String,
    pub category: Option<Category>,
    pub split_between: String,
}

impl ExpenseRow {
    pub fn participants(&self) -> Vec<UserId> {
        self.split_between
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(UserId::from)
            .collect()
    }

    pub fn to_request(&self) -> Result<NewExpense> {
        Ok(NewExpense {
            description: self.description.clone(),
            amount: self.amount,
            category: self.category.unwrap_or_default(),
            shares: equal_split(self.amount, &self.participants())?,
        })
    }
}

/// Reads equal-split expenses from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and tolerating ragged rows.
pub struct ExpenseReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ExpenseReader<R> {
    /// Creates a new `ExpenseReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes rows.
    pub fn rows(self) -> impl Iterator<Item = Result<ExpenseRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(SplitError::from))
    }
}
