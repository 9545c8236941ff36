//! The balance engine.
//!
//! Balances are never stored. Every report is a pure function of the viewer,
//! the group roster and the group's full expense history, recomputed on each
//! request.

use super::expense::Expense;
use super::group::Roster;
use super::money::Money;
use super::user::UserId;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the viewer stands against one other member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberBalance {
    pub user_id: UserId,
    pub name: String,
    /// What the viewer owes this member.
    pub you_owe: Money,
    /// What this member owes the viewer.
    pub owes_you: Money,
    /// `owes_you - you_owe`; positive means the member owes the viewer.
    pub net: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub total_you_owe: Money,
    pub total_owes_you: Money,
    pub net_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceReport {
    pub summary: BalanceSummary,
    /// Members with an open balance, ordered by user id.
    pub members: Vec<MemberBalance>,
}

/// A member's position against the whole group: paid minus owed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetPosition {
    pub user_id: UserId,
    pub name: String,
    pub net: Money,
}

/// The viewer's totals across every expense they take part in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub you_owe: Money,
    pub owed_to_you: Money,
    pub total_balance: Money,
}

/// Computes the viewer's pairwise balances against every other group member.
///
/// The viewer must be on the roster. Expenses are folded in any order; the
/// result only depends on their contents. Shares or payers that are not on
/// the roster are ignored.
///
/// Expenses whose shares drift from their amount are not corrected: they are
/// logged and folded as-is.
pub fn compute_pairwise_balances(
    viewer: &UserId,
    roster: &Roster,
    expenses: &[Expense],
) -> Result<BalanceReport> {
    roster.ensure_member(viewer)?;

    let initial: BTreeMap<&UserId, Money> = roster
        .members
        .iter()
        .filter(|m| &m.user_id != viewer)
        .map(|m| (&m.user_id, Money::ZERO))
        .collect();

    let net = expenses.iter().fold(initial, |mut net, expense| {
        warn_if_inconsistent(expense);
        if &expense.paid_by == viewer {
            for share in expense.shares.iter().filter(|s| &s.user != viewer) {
                credit(&mut net, &share.user, share.amount);
            }
        } else if let Some(owed) = expense.share_of(viewer) {
            credit(&mut net, &expense.paid_by, -owed);
        }
        net
    });

    let members: Vec<MemberBalance> = roster
        .members
        .iter()
        .filter_map(|member| {
            let raw = *net.get(&member.user_id)?;
            if !raw.is_material() {
                return None;
            }
            let you_owe = (-raw).positive_part().round_cents();
            let owes_you = raw.positive_part().round_cents();
            let balance = MemberBalance {
                user_id: member.user_id.clone(),
                name: member.name.clone(),
                you_owe,
                owes_you,
                net: owes_you - you_owe,
            };
            Some((&member.user_id, balance))
        })
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .collect();

    let total_you_owe: Money = members.iter().map(|m| m.you_owe).sum();
    let total_owes_you: Money = members.iter().map(|m| m.owes_you).sum();
    let summary = BalanceSummary {
        total_you_owe: total_you_owe.round_cents(),
        total_owes_you: total_owes_you.round_cents(),
        net_balance: (total_owes_you - total_you_owe).round_cents(),
    };

    Ok(BalanceReport { summary, members })
}

/// Computes every member's net position in the group: what they paid minus
/// what they owe. For consistent expenses the positions sum to zero.
pub fn compute_group_net(roster: &Roster, expenses: &[Expense]) -> Vec<NetPosition> {
    let initial: BTreeMap<&UserId, Money> = roster
        .members
        .iter()
        .map(|m| (&m.user_id, Money::ZERO))
        .collect();

    let net = expenses.iter().fold(initial, |mut net, expense| {
        warn_if_inconsistent(expense);
        credit(&mut net, &expense.paid_by, expense.amount);
        for share in &expense.shares {
            credit(&mut net, &share.user, -share.amount);
        }
        net
    });

    let mut positions: Vec<NetPosition> = roster
        .members
        .iter()
        .filter_map(|member| {
            net.get(&member.user_id).map(|amount| NetPosition {
                user_id: member.user_id.clone(),
                name: member.name.clone(),
                net: amount.round_cents(),
            })
        })
        .collect();
    positions.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    positions.dedup_by(|a, b| a.user_id == b.user_id);
    positions
}

/// Totals what the viewer owes and is owed across `expenses`, whatever group
/// they belong to.
pub fn compute_overview(viewer: &UserId, expenses: &[Expense]) -> Overview {
    let (you_owe, owed_to_you) =
        expenses
            .iter()
            .fold((Money::ZERO, Money::ZERO), |(you_owe, owed), expense| {
                if &expense.paid_by == viewer {
                    let others: Money = expense
                        .shares
                        .iter()
                        .filter(|s| &s.user != viewer)
                        .map(|s| s.amount)
                        .sum();
                    (you_owe, owed + others)
                } else {
                    let mine = expense.share_of(viewer).unwrap_or(Money::ZERO);
                    (you_owe + mine, owed)
                }
            });

    Overview {
        you_owe: you_owe.round_cents(),
        owed_to_you: owed_to_you.round_cents(),
        total_balance: (owed_to_you - you_owe).round_cents(),
    }
}

fn credit(net: &mut BTreeMap<&UserId, Money>, user: &UserId, amount: Money) {
    match net.get_mut(user) {
        Some(balance) => *balance += amount,
        None => tracing::debug!(%user, "ignoring entry for user outside the roster"),
    }
}

fn warn_if_inconsistent(expense: &Expense) {
    if let Err(err) = expense.check_consistency() {
        tracing::warn!(
            expense = %expense.id,
            group = %expense.group,
            "tolerating inconsistent expense: {err}"
        );
    }
}
