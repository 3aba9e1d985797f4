//! Integration tests for write serialization and correlated replies.
//!
//! A reserve-style reducer checks stock and decrements it in one call. Many
//! concurrent senders must never push the counter below zero, and each
//! caller must receive the reply carrying its own ticket.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use std::time::Duration;
use stockroom_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use stockroom_runtime::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShelfAction {
    Take { ticket: u32, quantity: u32 },
    Taken { ticket: u32, remaining: u32 },
    Refused { ticket: u32 },
}

impl ShelfAction {
    const fn ticket(&self) -> u32 {
        match self {
            Self::Take { ticket, .. } | Self::Taken { ticket, .. } | Self::Refused { ticket } => {
                *ticket
            },
        }
    }
}

#[derive(Clone)]
struct ShelfReducer;

impl Reducer for ShelfReducer {
    type State = u32;
    type Action = ShelfAction;
    type Environment = ();

    fn reduce(
        &self,
        stock: &mut u32,
        action: ShelfAction,
        _env: &(),
    ) -> SmallVec<[Effect<ShelfAction>; 4]> {
        match action {
            ShelfAction::Take { ticket, quantity } => match stock.checked_sub(quantity) {
                Some(remaining) => {
                    *stock = remaining;
                    smallvec![Effect::emit(ShelfAction::Taken { ticket, remaining })]
                },
                None => smallvec![Effect::emit(ShelfAction::Refused { ticket })],
            },
            ShelfAction::Taken { .. } | ShelfAction::Refused { .. } => SmallVec::new(),
        }
    }
}

#[tokio::test]
async fn concurrent_takes_never_overdraw() {
    let store = Store::with_config(
        10,
        ShelfReducer,
        (),
        stockroom_runtime::StoreConfig::default().with_broadcast_capacity(128),
    );

    let mut handles = Vec::new();
    for ticket in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .send_and_wait_for(
                    ShelfAction::Take {
                        ticket,
                        quantity: 3,
                    },
                    move |a| !matches!(a, ShelfAction::Take { .. }) && a.ticket() == ticket,
                    Duration::from_secs(2),
                )
                .await
        }));
    }

    let mut taken = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            ShelfAction::Taken { .. } => taken += 1,
            ShelfAction::Refused { .. } => {},
            ShelfAction::Take { .. } => unreachable!("predicate excludes commands"),
        }
    }

    // 10 units, 3 per take: exactly three takes fit
    assert_eq!(taken, 3);
    assert_eq!(store.state(|s| *s).await, 1);
}

#[tokio::test]
async fn replies_are_matched_to_their_caller() {
    let store = Store::new(100, ShelfReducer, ());

    let reply = store
        .send_and_wait_for(
            ShelfAction::Take {
                ticket: 42,
                quantity: 5,
            },
            |a| matches!(a, ShelfAction::Taken { ticket: 42, .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(
        reply,
        ShelfAction::Taken {
            ticket: 42,
            remaining: 95
        }
    );
}

#[tokio::test]
async fn replies_arrive_while_broadcast_subscribers_lag() {
    let store = Store::with_config(
        1000,
        ShelfReducer,
        (),
        stockroom_runtime::StoreConfig::default().with_broadcast_capacity(1),
    );
    // Never read, so the broadcast overflows
    let _idle = store.subscribe_actions();

    let mut handles = Vec::new();
    for ticket in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .send_and_wait_for(
                    ShelfAction::Take {
                        ticket,
                        quantity: 1,
                    },
                    move |a| !matches!(a, ShelfAction::Take { .. }) && a.ticket() == ticket,
                    Duration::from_secs(2),
                )
                .await
        }));
    }

    for handle in handles {
        assert!(matches!(
            handle.await.unwrap().unwrap(),
            ShelfAction::Taken { .. }
        ));
    }
    assert_eq!(store.state(|s| *s).await, 950);
}
