//! Optimistic commit behaviour of concurrent transactions.

use reputation_contract::{
    ContractError, ErrorKind, MemoryStore, ReputationContract, SatisfactionEventArgs, StoreError,
    TransactionContext, WorldState,
};
use sla_core::{Agreement, Category};

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    let contract = ReputationContract::default();
    let mut ctx = TransactionContext::new(&store, "tx-seed");
    contract.create_service(&mut ctx, "hotel-1").unwrap();
    reputation_contract::registry::add_agreement(
        &mut ctx,
        "hotel-1",
        Agreement::new("view-1", Category::View, vec![], false, vec![]),
    )
    .unwrap();
    store.commit(&ctx.into_write_set()).unwrap();
    store
}

fn event(evaluation_id: &str, satisfied: bool) -> SatisfactionEventArgs {
    SatisfactionEventArgs {
        service_id: "hotel-1".to_string(),
        agreement_id: "view-1".to_string(),
        evaluation_id: evaluation_id.to_string(),
        satisfied,
        ..Default::default()
    }
}

#[test]
fn test_second_writer_on_same_service_conflicts() {
    let store = seeded_store();
    let contract = ReputationContract::default();

    let mut first = TransactionContext::new(&store, "tx-a");
    let mut second = TransactionContext::new(&store, "tx-b");
    contract
        .handle_satisfaction_event(&mut first, &event("eval-a", false))
        .unwrap();
    contract
        .handle_satisfaction_event(&mut second, &event("eval-b", true))
        .unwrap();

    store.commit(&first.into_write_set()).unwrap();
    let err = store.commit(&second.into_write_set()).unwrap_err();
    assert!(matches!(err, StoreError::Conflict { ref key } if key == "hotel-1"));

    let err = ContractError::from(err);
    assert_eq!(err.kind(), ErrorKind::StorageError);

    let mut ctx = TransactionContext::new(&store, "tx-read");
    let service = contract.read_service(&mut ctx, "hotel-1").unwrap();
    let agreement = service.agreement("view-1").unwrap();
    assert_eq!(agreement.total_feedbacks, 1);
    assert_eq!(agreement.total_unsatisfied, 1);
    assert!(contract.read_evaluation(&mut ctx, "eval-b").is_err());
}

#[test]
fn test_retry_after_conflict_succeeds() {
    let store = seeded_store();
    let contract = ReputationContract::default();

    let mut stale = TransactionContext::new(&store, "tx-stale");
    contract
        .handle_satisfaction_event(&mut stale, &event("eval-1", true))
        .unwrap();

    let mut winner = TransactionContext::new(&store, "tx-winner");
    contract.delete_service(&mut winner, "hotel-1").unwrap();
    contract.create_service(&mut winner, "hotel-1").unwrap();
    store.commit(&winner.into_write_set()).unwrap();

    assert!(store.commit(&stale.into_write_set()).is_err());

    // The recreated service has no agreements, so the retry fails cleanly
    let mut retry = TransactionContext::new(&store, "tx-retry");
    let err = contract
        .handle_satisfaction_event(&mut retry, &event("eval-1", true))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_disjoint_services_commit_independently() {
    let store = seeded_store();
    let contract = ReputationContract::default();

    let mut a = TransactionContext::new(&store, "tx-a");
    contract.create_service(&mut a, "hotel-2").unwrap();
    let mut b = TransactionContext::new(&store, "tx-b");
    contract.create_service(&mut b, "hotel-3").unwrap();

    store.commit(&a.into_write_set()).unwrap();
    store.commit(&b.into_write_set()).unwrap();

    let mut ctx = TransactionContext::new(&store, "tx-read");
    assert_eq!(contract.list_services(&mut ctx).unwrap().len(), 3);
}
