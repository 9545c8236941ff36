use crate::domain::expense::{Expense, ExpenseId};
use crate::domain::group::{Group, GroupId};
use crate::domain::ports::{ExpenseStore, GroupStore, UserStore};
use crate::domain::user::{User, UserId};
use crate::error::{Result, SplitError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing users.
pub const CF_USERS: &str = "users";
/// Column Family for storing groups.
pub const CF_GROUPS: &str = "groups";
/// Column Family for storing expense history.
pub const CF_EXPENSES: &str = "expenses";

/// Separates the group id from the expense id in expense keys, so that a
/// group's expenses form one contiguous key range. Group ids never contain
/// control characters, so the separator cannot occur inside one.
const KEY_SEPARATOR: u8 = 0;

/// A persistent store implementation using RocksDB.
///
/// Users, groups and expenses live in separate Column Families. Values are
/// JSON documents.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the
    /// column families on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_USERS, CF_GROUPS, CF_EXPENSES]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            SplitError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn put<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<()> {
        let handle = self.cf(cf)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(handle, key, bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        let handle = self.cf(cf)?;
        match self.db.get_pinned_cf(handle, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Decodes every value whose key starts with `prefix`.
    fn scan<T: DeserializeOwned>(&self, cf: &str, prefix: &[u8]) -> Result<Vec<T>> {
        let handle = self.cf(cf)?;
        let iter = self
            .db
            .iterator_cf(handle, IteratorMode::From(prefix, Direction::Forward));

        let mut values = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

fn expense_key(group: &GroupId, expense: &ExpenseId) -> Vec<u8> {
    let mut key = group_prefix(group);
    key.extend_from_slice(expense.as_str().as_bytes());
    key
}

fn group_prefix(group: &GroupId) -> Vec<u8> {
    let mut key = group.as_str().as_bytes().to_vec();
    key.push(KEY_SEPARATOR);
    key
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn store(&self, user: User) -> Result<()> {
        self.put(CF_USERS, user.id.as_str().as_bytes(), &user)
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<User>> {
        self.fetch(CF_USERS, user_id.as_str().as_bytes())
    }
}

#[async_trait]
impl GroupStore for RocksDBStore {
    async fn store(&self, group: Group) -> Result<()> {
        self.put(CF_GROUPS, group.id.as_str().as_bytes(), &group)
    }

    async fn get(&self, group_id: &GroupId) -> Result<Option<Group>> {
        self.fetch(CF_GROUPS, group_id.as_str().as_bytes())
    }

    async fn groups_for(&self, user_id: &UserId) -> Result<Vec<Group>> {
        let groups: Vec<Group> = self.scan(CF_GROUPS, &[])?;
        Ok(groups.into_iter().filter(|g| g.is_member(user_id)).collect())
    }
}

#[async_trait]
impl ExpenseStore for RocksDBStore {
    async fn append(&self, expense: Expense) -> Result<()> {
        let key = expense_key(&expense.group, &expense.id);
        self.put(CF_EXPENSES, &key, &expense)
    }

    async fn for_group(&self, group_id: &GroupId) -> Result<Vec<Expense>> {
        let mut expenses: Vec<Expense> = self.scan(CF_EXPENSES, &group_prefix(group_id))?;
        expenses.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(expenses)
    }

    async fn get(&self, group_id: &GroupId, expense_id: &ExpenseId) -> Result<Option<Expense>> {
        self.fetch(CF_EXPENSES, &expense_key(group_id, expense_id))
    }
}
