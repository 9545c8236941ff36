use crate::domain::expense::{Expense, ExpenseId};
use crate::domain::group::{Group, GroupId};
use crate::domain::ports::{ExpenseStore, GroupStore, UserStore};
use crate::domain::user::{User, UserId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for users.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    /// Creates a new, empty in-memory user store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }
}

/// A thread-safe in-memory store for groups.
///
/// Uses `Arc<RwLock<HashMap<GroupId, Group>>>` so clones share the same data.
#[derive(Default, Clone)]
pub struct InMemoryGroupStore {
    groups: Arc<RwLock<HashMap<GroupId, Group>>>,
}

impl InMemoryGroupStore {
    /// Creates a new, empty in-memory group store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupStore for InMemoryGroupStore {
    async fn store(&self, group: Group) -> Result<()> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get(&self, group_id: &GroupId) -> Result<Option<Group>> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn groups_for(&self, user_id: &UserId) -> Result<Vec<Group>> {
        let groups = self.groups.read().await;
        let mut found: Vec<Group> = groups
            .values()
            .filter(|g| g.is_member(user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }
}

/// A thread-safe, append-only in-memory expense history, bucketed by group.
#[derive(Default, Clone)]
pub struct InMemoryExpenseStore {
    expenses: Arc<RwLock<HashMap<GroupId, Vec<Expense>>>>,
}

impl InMemoryExpenseStore {
    /// Creates a new, empty in-memory expense store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseStore for InMemoryExpenseStore {
    async fn append(&self, expense: Expense) -> Result<()> {
        let mut expenses = self.expenses.write().await;
        expenses
            .entry(expense.group.clone())
            .or_default()
            .push(expense);
        Ok(())
    }

    async fn for_group(&self, group_id: &GroupId) -> Result<Vec<Expense>> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(group_id).cloned().unwrap_or_default())
    }

    async fn get(&self, group_id: &GroupId, expense_id: &ExpenseId) -> Result<Option<Expense>> {
        let expenses = self.expenses.read().await;
        Ok(expenses
            .get(group_id)
            .and_then(|history| history.iter().find(|e| &e.id == expense_id))
            .cloned())
    }
}
