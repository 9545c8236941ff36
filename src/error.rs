use crate::domain::expense::ExpenseId;
use crate::domain::group::GroupId;
use crate::domain::user::UserId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),
    #[error("User not found: {0}")]
    UserNotFound(UserId),
    #[error("Not authorized: {user} is not a member of group {group}")]
    NotAGroupMember { user: UserId, group: GroupId },
    #[error("{user} is already a member of group {group}")]
    AlreadyMember { user: UserId, group: GroupId },
    #[error("Group already exists: {0}")]
    GroupExists(GroupId),
    #[error("Username already taken: {0}")]
    UsernameTaken(UserId),
    #[error("Expense already recorded: {0}")]
    ExpenseExists(ExpenseId),
    #[error("Total amount ({amount}) does not match shares sum ({shares})")]
    ShareMismatch { amount: Decimal, shares: Decimal },
    /// Advisory only: an already stored expense whose shares drifted from its amount.
    #[error("Expense {expense} is inconsistent: amount {amount}, shares sum {shares}")]
    InconsistentExpense {
        expense: ExpenseId,
        amount: Decimal,
        shares: Decimal,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, SplitError>;
