use billsplit::application::service::SplitService;
use billsplit::domain::expense::{NewExpense, equal_split};
use billsplit::domain::group::Group;
use billsplit::domain::money::Money;
use billsplit::domain::ports::{ExpenseStoreBox, GroupStoreBox, UserStoreBox};
use billsplit::domain::user::{User, UserId};
use billsplit::infrastructure::in_memory::{
    InMemoryExpenseStore, InMemoryGroupStore, InMemoryUserStore,
};
use rust_decimal_macros::dec;
use std::sync::Arc;

mod common;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let user_store: UserStoreBox = Box::new(InMemoryUserStore::new());
    let group_store: GroupStoreBox = Box::new(InMemoryGroupStore::new());
    let expense_store: ExpenseStoreBox = Box::new(InMemoryExpenseStore::new());

    let user = User::new("a".into(), Some("Alice".to_string()));
    let group = Group::new("g".into(), "G", "a".into()).unwrap();
    let expense = NewExpense {
        description: "Snacks".to_string(),
        amount: Money::new(dec!(12)),
        category: Default::default(),
        shares: equal_split(Money::new(dec!(12)), &["a".into()]).unwrap(),
    }
    .into_expense("g".into(), "a".into());

    // Verify Send + Sync by spawning tasks
    let user_handle = tokio::spawn(async move {
        user_store.store(user).await.unwrap();
        user_store.get(&"a".into()).await.unwrap().unwrap()
    });
    let group_handle = tokio::spawn(async move {
        group_store.store(group).await.unwrap();
        group_store.groups_for(&"a".into()).await.unwrap()
    });
    let expense_handle = tokio::spawn(async move {
        expense_store.append(expense).await.unwrap();
        expense_store.for_group(&"g".into()).await.unwrap()
    });

    assert_eq!(user_handle.await.unwrap().display_name(), "Alice");
    assert_eq!(group_handle.await.unwrap().len(), 1);
    assert_eq!(expense_handle.await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_expense_creation_in_one_group() {
    let service: Arc<SplitService> = Arc::new(common::in_memory_service());
    let members: Vec<UserId> = vec!["a".into(), "b".into(), "c".into()];
    for id in &members {
        service.register_user(id.clone(), None).await.unwrap();
    }
    service
        .create_group("g".into(), "G", &"a".into())
        .await
        .unwrap();
    service.join_group(&"g".into(), &"b".into()).await.unwrap();
    service.join_group(&"g".into(), &"c".into()).await.unwrap();

    let mut handles = Vec::new();
    for n in 0..30 {
        let service = Arc::clone(&service);
        let members = members.clone();
        handles.push(tokio::spawn(async move {
            let payer = members[n % members.len()].clone();
            let request = NewExpense {
                description: format!("round {n}"),
                amount: Money::new(dec!(9)),
                category: Default::default(),
                shares: equal_split(Money::new(dec!(9)), &members).unwrap(),
            };
            service.create_expense(&"g".into(), &payer, request).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let expenses = service.list_expenses(&"g".into(), &"a".into()).await.unwrap();
    assert_eq!(expenses.len(), 30);

    // Everyone paid ten equal rounds, so everything cancels out.
    let report = service.group_balances(&"g".into(), &"a".into()).await.unwrap();
    assert!(report.members.is_empty());
    assert_eq!(report.summary.net_balance, Money::ZERO);
}
