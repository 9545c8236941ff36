use crate::domain::balance::{
    self, BalanceReport, NetPosition, Overview, compute_group_net, compute_pairwise_balances,
};
use crate::domain::expense::{Expense, ExpenseId, NewExpense};
use crate::domain::group::{Group, GroupId, Member, Roster};
use crate::domain::ports::{ExpenseStoreBox, GroupStoreBox, UserStoreBox};
use crate::domain::user::{User, UserId};
use crate::error::{Result, SplitError};

/// How many expenses the activity feed shows.
pub const ACTIVITY_LIMIT: usize = 20;

/// The entry point the REST layer calls into.
///
/// `SplitService` owns the storage backends and enforces membership before
/// anything is read or written. Balances are always recomputed from the stored
/// expense history; nothing derived is ever written back.
pub struct SplitService {
    users: UserStoreBox,
    groups: GroupStoreBox,
    expenses: ExpenseStoreBox,
}

impl SplitService {
    /// Creates a new `SplitService` over the given stores.
    pub fn new(users: UserStoreBox, groups: GroupStoreBox, expenses: ExpenseStoreBox) -> Self {
        Self {
            users,
            groups,
            expenses,
        }
    }

    /// Registers a user under a unique handle.
    pub async fn register_user(&self, id: UserId, name: Option<String>) -> Result<User> {
        if id.as_str().trim().is_empty() {
            return Err(SplitError::ValidationError(
                "Username is required".to_string(),
            ));
        }
        if self.users.get(&id).await?.is_some() {
            return Err(SplitError::UsernameTaken(id));
        }
        let user = User::new(id, name);
        self.users.store(user.clone()).await?;
        tracing::info!(user = %user.id, "registered user");
        Ok(user)
    }

    /// Creates a group with `creator` as its first member.
    pub async fn create_group(&self, id: GroupId, name: &str, creator: &UserId) -> Result<Group> {
        self.require_user(creator).await?;
        if self.groups.get(&id).await?.is_some() {
            return Err(SplitError::GroupExists(id));
        }
        let group = Group::new(id, name, creator.clone())?;
        self.groups.store(group.clone()).await?;
        tracing::info!(group = %group.id, creator = %creator, "created group");
        Ok(group)
    }

    pub async fn join_group(&self, group_id: &GroupId, user: &UserId) -> Result<Group> {
        self.require_user(user).await?;
        let mut group = self.require_group(group_id).await?;
        group.join(user.clone())?;
        self.groups.store(group.clone()).await?;
        tracing::info!(group = %group_id, user = %user, "joined group");
        Ok(group)
    }

    /// The viewer's groups, most recently created first.
    pub async fn user_groups(&self, viewer: &UserId) -> Result<Vec<Group>> {
        self.require_user(viewer).await?;
        let mut groups = self.groups.groups_for(viewer).await?;
        groups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(groups)
    }

    /// The group's members with their display names. Only members may look.
    pub async fn group_members(&self, group_id: &GroupId, viewer: &UserId) -> Result<Vec<Member>> {
        let group = self.require_group(group_id).await?;
        group.ensure_member(viewer)?;
        Ok(self.roster(&group).await?.members)
    }

    /// Records an expense paid by `payer`.
    ///
    /// Rejects requests from non-members and requests whose shares do not add
    /// up to the amount. Concurrent calls for the same group append
    /// independent records and need no coordination.
    pub async fn create_expense(
        &self,
        group_id: &GroupId,
        payer: &UserId,
        request: NewExpense,
    ) -> Result<Expense> {
        self.record_expense(group_id, payer, ExpenseId::generate(), request)
            .await
    }

    /// Records an expense under an id issued outside the service.
    ///
    /// Fails with `ExpenseExists` when the group already holds that id, so
    /// replaying the same import never records an expense twice.
    pub async fn import_expense(
        &self,
        group_id: &GroupId,
        payer: &UserId,
        id: ExpenseId,
        request: NewExpense,
    ) -> Result<Expense> {
        if id.as_str().trim().is_empty() {
            return Err(SplitError::ValidationError(
                "Expense id must not be blank".to_string(),
            ));
        }
        if self.expenses.get(group_id, &id).await?.is_some() {
            return Err(SplitError::ExpenseExists(id));
        }
        self.record_expense(group_id, payer, id, request).await
    }

    async fn record_expense(
        &self,
        group_id: &GroupId,
        payer: &UserId,
        id: ExpenseId,
        request: NewExpense,
    ) -> Result<Expense> {
        let group = self.require_group(group_id).await?;
        group.ensure_member(payer)?;
        request.validate(&group, payer)?;

        let expense = request.into_expense_with_id(id, group.id, payer.clone());
        self.expenses.append(expense.clone()).await?;
        tracing::info!(
            expense = %expense.id,
            group = %expense.group,
            amount = %expense.amount,
            "created expense"
        );
        Ok(expense)
    }

    /// The group's expenses, newest first.
    pub async fn list_expenses(&self, group_id: &GroupId, viewer: &UserId) -> Result<Vec<Expense>> {
        let group = self.require_group(group_id).await?;
        group.ensure_member(viewer)?;
        let mut expenses = self.expenses.for_group(group_id).await?;
        // Stores hand back insertion order; reversing first keeps same-instant
        // expenses newest first under the stable sort.
        expenses.reverse();
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(expenses)
    }

    /// The viewer's pairwise balances against every other member of the group.
    pub async fn group_balances(
        &self,
        group_id: &GroupId,
        viewer: &UserId,
    ) -> Result<BalanceReport> {
        let group = self.require_group(group_id).await?;
        group.ensure_member(viewer)?;
        let roster = self.roster(&group).await?;
        let expenses = self.expenses.for_group(group_id).await?;
        compute_pairwise_balances(viewer, &roster, &expenses)
    }

    /// Every member's net position in the group.
    pub async fn group_net_balances(
        &self,
        group_id: &GroupId,
        viewer: &UserId,
    ) -> Result<Vec<NetPosition>> {
        let group = self.require_group(group_id).await?;
        group.ensure_member(viewer)?;
        let roster = self.roster(&group).await?;
        let expenses = self.expenses.for_group(group_id).await?;
        Ok(compute_group_net(&roster, &expenses))
    }

    /// The viewer's totals across all of their groups.
    pub async fn overview(&self, viewer: &UserId) -> Result<Overview> {
        self.require_user(viewer).await?;
        let mut expenses = Vec::new();
        for group in self.groups.groups_for(viewer).await? {
            expenses.extend(self.expenses.for_group(&group.id).await?);
        }
        Ok(balance::compute_overview(viewer, &expenses))
    }

    /// The most recent expenses across all of the viewer's groups, newest
    /// first, capped at [`ACTIVITY_LIMIT`].
    pub async fn activity(&self, viewer: &UserId) -> Result<Vec<Expense>> {
        self.require_user(viewer).await?;
        let mut expenses = Vec::new();
        for group in self.groups.groups_for(viewer).await? {
            expenses.extend(self.expenses.for_group(&group.id).await?);
        }
        expenses.reverse();
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        expenses.truncate(ACTIVITY_LIMIT);
        Ok(expenses)
    }

    async fn require_user(&self, id: &UserId) -> Result<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| SplitError::UserNotFound(id.clone()))
    }

    async fn require_group(&self, id: &GroupId) -> Result<Group> {
        self.groups
            .get(id)
            .await?
            .ok_or_else(|| SplitError::GroupNotFound(id.clone()))
    }

    /// Resolves member names; members without a stored profile keep their handle.
    async fn roster(&self, group: &Group) -> Result<Roster> {
        let mut members = Vec::with_capacity(group.members.len());
        for id in &group.members {
            let name = match self.users.get(id).await? {
                Some(user) => user.display_name().to_string(),
                None => id.to_string(),
            };
            members.push(Member {
                user_id: id.clone(),
                name,
            });
        }
        Ok(Roster::new(group.id.clone(), members))
    }
}
