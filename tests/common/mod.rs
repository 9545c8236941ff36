#![allow(dead_code)]

use billsplit::application::service::SplitService;
use billsplit::domain::expense::{Category, Expense, ExpenseId, Share};
use billsplit::domain::group::{Member, Roster};
use billsplit::domain::money::Money;
use billsplit::infrastructure::in_memory::{
    InMemoryExpenseStore, InMemoryGroupStore, InMemoryUserStore,
};
use chrono::{TimeZone, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

pub fn in_memory_service() -> SplitService {
    SplitService::new(
        Box::new(InMemoryUserStore::new()),
        Box::new(InMemoryGroupStore::new()),
        Box::new(InMemoryExpenseStore::new()),
    )
}

pub fn roster(ids: &[&str]) -> Roster {
    Roster::new(
        "g".into(),
        ids.iter()
            .map(|id| Member {
                user_id: (*id).into(),
                name: id.to_string(),
            })
            .collect(),
    )
}

/// Generates `count` consistent expenses among `ids` with whole-cent shares.
pub fn random_expenses(rng: &mut StdRng, ids: &[&str], count: usize) -> Vec<Expense> {
    (0..count)
        .map(|n| {
            let payer = ids[rng.gen_range(0..ids.len())];
            let mut shares = Vec::new();
            for id in ids {
                if rng.gen_bool(0.7) {
                    let cents: i64 = rng.gen_range(1..=50_000);
                    shares.push(Share::new((*id).into(), Money::new(Decimal::new(cents, 2))));
                }
            }
            let amount: Money = shares.iter().map(|s| s.amount).sum();
            Expense {
                id: ExpenseId::new(format!("e{n}")),
                group: "g".into(),
                paid_by: payer.into(),
                description: format!("expense {n}"),
                category: Category::Other,
                amount,
                shares,
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            }
        })
        .filter(|e| !e.shares.is_empty())
        .collect()
}

pub fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}
