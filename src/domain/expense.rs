use super::group::{Group, GroupId};
use super::money::{MAX_AMOUNT, Money, SHARE_TOLERANCE};
use super::user::UserId;
use crate::error::{Result, SplitError};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Issues a fresh random id for a newly created expense.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Entertainment,
    Utilities,
    #[default]
    Other,
}

/// The portion of an expense one member is responsible for.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Share {
    pub user: UserId,
    pub amount: Money,
}

impl Share {
    pub fn new(user: UserId, amount: Money) -> Self {
        Self { user, amount }
    }
}

/// A stored expense. Immutable once created.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Expense {
    pub id: ExpenseId,
    pub group: GroupId,
    pub paid_by: UserId,
    pub description: String,
    #[serde(default)]
    pub category: Category,
    pub amount: Money,
    pub shares: Vec<Share>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn shares_total(&self) -> Money {
        self.shares.iter().map(|s| s.amount).sum()
    }

    /// Everything `user` owes on this expense.
    ///
    /// Duplicate entries for the same user are summed. Returns `None` when the
    /// user holds no share at all.
    pub fn share_of(&self, user: &UserId) -> Option<Money> {
        self.shares
            .iter()
            .filter(|s| &s.user == user)
            .map(|s| s.amount)
            .reduce(|acc, amount| acc + amount)
    }

    /// Checks that the shares still add up to the amount within tolerance.
    pub fn check_consistency(&self) -> Result<()> {
        let shares = self.shares_total();
        if (shares - self.amount).abs() > SHARE_TOLERANCE {
            return Err(SplitError::InconsistentExpense {
                expense: self.id.clone(),
                amount: self.amount.value(),
                shares: shares.value(),
            });
        }
        Ok(())
    }
}

/// An expense-creation request, as received from a client.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct NewExpense {
    pub description: String,
    pub amount: Money,
    #[serde(default)]
    pub category: Category,
    pub shares: Vec<Share>,
}

impl NewExpense {
    /// Validates the request against the group it is filed in.
    ///
    /// The balance computation trusts what passes here and never re-validates
    /// stored expenses, so share mismatches must be rejected now.
    pub fn validate(&self, group: &Group, payer: &UserId) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(SplitError::ValidationError(
                "Description is required".to_string(),
            ));
        }
        if !self.amount.is_positive() {
            return Err(SplitError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }
        if self.amount > MAX_AMOUNT {
            return Err(SplitError::ValidationError(
                "Amount out of range".to_string(),
            ));
        }
        if self.shares.is_empty() {
            return Err(SplitError::ValidationError(
                "At least one share is required".to_string(),
            ));
        }
        group.ensure_member(payer)?;
        let mut shares = Money::ZERO;
        for share in &self.shares {
            if share.amount.is_negative() {
                return Err(SplitError::ValidationError(format!(
                    "Share of {} must not be negative",
                    share.user
                )));
            }
            group.ensure_member(&share.user)?;
            shares = shares
                .checked_add(share.amount)
                .ok_or_else(|| SplitError::ValidationError("Amount out of range".to_string()))?;
        }

        if (self.amount - shares).abs() > SHARE_TOLERANCE {
            return Err(SplitError::ShareMismatch {
                amount: self.amount.value(),
                shares: shares.value(),
            });
        }
        Ok(())
    }

    /// Stamps the request with a fresh id and the creation time.
    pub fn into_expense(self, group: GroupId, paid_by: UserId) -> Expense {
        self.into_expense_with_id(ExpenseId::generate(), group, paid_by)
    }

    /// Like [`NewExpense::into_expense`], keeping an id issued elsewhere.
    pub fn into_expense_with_id(self, id: ExpenseId, group: GroupId, paid_by: UserId) -> Expense {
        Expense {
            id,
            group,
            paid_by,
            description: self.description,
            category: self.category,
            amount: self.amount,
            shares: self.shares,
            created_at: Utc::now(),
        }
    }
}

/// Splits `amount` equally between `participants`.
///
/// Works in whole cents: the leftover cents go one each to the first
/// participants, so the shares always sum exactly to `amount`.
pub fn equal_split(amount: Money, participants: &[UserId]) -> Result<Vec<Share>> {
    if participants.is_empty() {
        return Err(SplitError::ValidationError(
            "Cannot split between zero participants".to_string(),
        ));
    }
    if !amount.is_positive() {
        return Err(SplitError::ValidationError(
            "Amount must be positive".to_string(),
        ));
    }
    if amount.round_cents() != amount {
        return Err(SplitError::ValidationError(
            "Amount must be expressed in whole cents".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = participants.iter().find(|p| !seen.insert(*p)) {
        return Err(SplitError::ValidationError(format!(
            "Participant {dup} listed twice"
        )));
    }

    let count = Decimal::from(participants.len());
    let base = (amount.value() / count).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let leftover_cents = ((amount.value() - base * count) * dec!(100))
        .to_usize()
        .ok_or_else(|| SplitError::ValidationError("Amount out of range".to_string()))?;

    Ok(participants
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let cent = if i < leftover_cents { dec!(0.01) } else { Decimal::ZERO };
            Share::new(user.clone(), Money::new(base + cent))
        })
        .collect())
}
