use super::expense::{Expense, ExpenseId};
use super::group::{Group, GroupId};
use super::user::{User, UserId};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn store(&self, user: User) -> Result<()>;
    async fn get(&self, user_id: &UserId) -> Result<Option<User>>;
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn store(&self, group: Group) -> Result<()>;
    async fn get(&self, group_id: &GroupId) -> Result<Option<Group>>;
    /// Every group `user_id` is a member of.
    async fn groups_for(&self, user_id: &UserId) -> Result<Vec<Group>>;
}

/// Append-only expense history.
///
/// Concurrent appends to the same group are independent records; readers see
/// whatever has been committed when they ask.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn append(&self, expense: Expense) -> Result<()>;
    async fn for_group(&self, group_id: &GroupId) -> Result<Vec<Expense>>;
    async fn get(&self, group_id: &GroupId, expense_id: &ExpenseId) -> Result<Option<Expense>>;
}

pub type UserStoreBox = Box<dyn UserStore>;
pub type GroupStoreBox = Box<dyn GroupStore>;
pub type ExpenseStoreBox = Box<dyn ExpenseStore>;
