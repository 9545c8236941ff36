//! JSON ledger import.
//!
//! A ledger lists users, groups and expenses. Applying it replays each record
//! through [`SplitService`], so every expense goes through the same creation
//! checks a live request would.

use crate::application::service::SplitService;
use crate::domain::expense::{Category, ExpenseId, NewExpense, Share, equal_split};
use crate::domain::group::GroupId;
use crate::domain::money::Money;
use crate::domain::user::UserId;
use crate::error::{Result, SplitError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, Default)]
pub struct Ledger {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
}

#[derive(Debug, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    pub created_by: UserId,
    /// Members besides the creator.
    #[serde(default)]
    pub members: Vec<UserId>,
}

/// An expense as written in a ledger: either explicit `shares` or a list of
/// members to split the amount between equally.
///
/// Records carrying an `id` are recorded once per group no matter how often
/// the ledger is applied; records without one are new expenses every time.
#[derive(Debug, Deserialize)]
pub struct ExpenseRecord {
    #[serde(default)]
    pub id: Option<ExpenseId>,
    pub group: GroupId,
    pub paid_by: UserId,
    pub description: String,
    pub amount: Money,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub shares: Vec<Share>,
    #[serde(default)]
    pub split_between: Vec<UserId>,
}

impl ExpenseRecord {
    pub fn to_request(&self) -> Result<NewExpense> {
        let shares = match (self.shares.is_empty(), self.split_between.is_empty()) {
            (false, false) => {
                return Err(SplitError::ValidationError(
                    "Give either shares or split_between, not both".to_string(),
                ));
            }
            (true, false) => equal_split(self.amount, &self.split_between)?,
            _ => self.shares.clone(),
        };
        Ok(NewExpense {
            description: self.description.clone(),
            amount: self.amount,
            category: self.category,
            shares,
        })
    }
}

/// Outcome of applying a ledger.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub applied: usize,
    pub skipped: usize,
    pub rejected: usize,
}

impl ImportStats {
    fn record(&mut self, what: &str, outcome: Result<()>) {
        match outcome {
            Ok(()) => self.applied += 1,
            Err(
                err @ (SplitError::UsernameTaken(_)
                | SplitError::GroupExists(_)
                | SplitError::AlreadyMember { .. }
                | SplitError::ExpenseExists(_)),
            ) => {
                tracing::debug!("skipping {what}: {err}");
                self.skipped += 1;
            }
            Err(err) => {
                tracing::error!("Error processing {what}: {err}");
                self.rejected += 1;
            }
        }
    }
}

pub struct LedgerReader<R: Read> {
    source: R,
}

impl<R: Read> LedgerReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn read(self) -> Result<Ledger> {
        Ok(serde_json::from_reader(self.source)?)
    }
}

impl Ledger {
    /// Replays the ledger through the service.
    ///
    /// Users, groups, memberships and expenses with an `id` that already exist
    /// are skipped, so a ledger whose expenses all carry ids can be applied to
    /// a persistent store more than once. Invalid records are logged and
    /// counted, never fatal.
    pub async fn apply(&self, service: &SplitService) -> ImportStats {
        let mut stats = ImportStats::default();

        for user in &self.users {
            let outcome = service
                .register_user(user.id.clone(), user.name.clone())
                .await
                .map(drop);
            stats.record(&format!("user {}", user.id), outcome);
        }

        for group in &self.groups {
            let outcome = service
                .create_group(group.id.clone(), &group.name, &group.created_by)
                .await
                .map(drop);
            stats.record(&format!("group {}", group.id), outcome);

            for member in group.members.iter().filter(|m| **m != group.created_by) {
                let outcome = service.join_group(&group.id, member).await.map(drop);
                stats.record(&format!("member {member} of group {}", group.id), outcome);
            }
        }

        for (line, expense) in self.expenses.iter().enumerate() {
            let outcome = match (expense.to_request(), &expense.id) {
                (Ok(request), Some(id)) => service
                    .import_expense(&expense.group, &expense.paid_by, id.clone(), request)
                    .await
                    .map(drop),
                (Ok(request), None) => service
                    .create_expense(&expense.group, &expense.paid_by, request)
                    .await
                    .map(drop),
                (Err(err), _) => Err(err),
            };
            stats.record(&format!("expense #{}", line + 1), outcome);
        }

        stats
    }
}
