//! Desk reducer.
//!
//! Turns each command into exactly one outcome event plus a notification.
//! Outcome events are already applied when they come back through the store,
//! so reducing them is a no-op.

use crate::actions::DeskAction;
use crate::environment::DeskEnvironment;
use crate::error::{Entity, LifecycleError};
use crate::lifecycle::{self, SubmissionForm};
use crate::notify::Notification;
use crate::state::DeskState;
use crate::types::{Component, ComponentId, CorrelationId, Operation, User, UserDetails, UserId};
use std::sync::Arc;
use stockroom_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

/// Reducer for the lending desk
#[derive(Clone, Debug, Default)]
pub struct DeskReducer;

impl DeskReducer {
    /// Creates a new `DeskReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a component name
    fn validate_name(name: &str) -> Result<(), LifecycleError> {
        if name.trim().is_empty() {
            return Err(LifecycleError::validation("Component name cannot be empty"));
        }
        Ok(())
    }

    fn add_component(
        state: &mut DeskState,
        component: Component,
    ) -> Result<Component, LifecycleError> {
        Self::validate_name(&component.name)?;
        if state.catalog.exists(&component.id) {
            return Err(LifecycleError::validation(format!(
                "Component {} already exists",
                component.id
            )));
        }
        state.catalog.insert(component.clone());
        Ok(component)
    }

    fn update_component(
        state: &mut DeskState,
        component: Component,
    ) -> Result<Component, LifecycleError> {
        Self::validate_name(&component.name)?;
        state.catalog.require(&component.id)?;
        state.catalog.insert(component.clone());
        Ok(component)
    }

    fn delete_component(
        state: &mut DeskState,
        component_id: &ComponentId,
    ) -> Result<Component, LifecycleError> {
        state
            .catalog
            .remove(component_id)
            .ok_or_else(|| LifecycleError::not_found(Entity::Component, component_id))
    }

    fn update_user(
        state: &mut DeskState,
        user_id: &UserId,
        details: UserDetails,
    ) -> Result<User, LifecycleError> {
        if details.name.trim().is_empty() {
            return Err(LifecycleError::validation("User name cannot be empty"));
        }
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| LifecycleError::not_found(Entity::User, user_id))?;
        user.apply_details(details);
        Ok(user.clone())
    }

    /// Notification announcing a successful outcome
    fn success_notification(event: &DeskAction) -> Option<Notification> {
        let notification = match event {
            DeskAction::RequestSubmitted { .. } => Notification::success(
                "Request Submitted",
                "Your component request has been sent for approval.",
            ),
            DeskAction::RequestApproved { .. } => {
                Notification::success("Request Approved", "Inventory has been updated.")
            },
            DeskAction::RequestRejected { request, .. } => Notification::success(
                "Request Rejected",
                format!("Request from {} has been rejected.", request.user_name),
            ),
            DeskAction::ReturnRegistered {
                component, quantity, ..
            } => Notification::success(
                "Return Processed",
                format!("{quantity} x {} returned to inventory.", component.name),
            ),
            DeskAction::ComponentAdded { component, .. } => Notification::success(
                "Component Added",
                format!("{} has been added to the inventory.", component.name),
            ),
            DeskAction::ComponentUpdated { component, .. } => Notification::success(
                "Component Updated",
                format!("{} has been updated.", component.name),
            ),
            DeskAction::ComponentDeleted { component, .. } => Notification::success(
                "Component Deleted",
                format!("{} has been removed from the inventory.", component.name),
            ),
            DeskAction::UserUpdated { user, .. } => Notification::success(
                "User Updated",
                format!("Details for {} have been updated.", user.name),
            ),
            _ => return None,
        };
        Some(notification)
    }

    /// Announces the outcome of a command and notifies the user
    fn conclude(
        correlation_id: CorrelationId,
        operation: Operation,
        outcome: Result<DeskAction, LifecycleError>,
        env: &DeskEnvironment,
    ) -> SmallVec<[Effect<DeskAction>; 4]> {
        let (event, notification) = match outcome {
            Ok(event) => {
                tracing::debug!(%correlation_id, %operation, "Operation applied");
                let notification = Self::success_notification(&event);
                (event, notification)
            },
            Err(error) => {
                tracing::warn!(%correlation_id, %operation, %error, "Operation refused");
                let notification = Notification::from_error(&error);
                (
                    DeskAction::OperationFailed {
                        correlation_id,
                        operation,
                        error,
                    },
                    Some(notification),
                )
            },
        };

        let mut effects: SmallVec<[Effect<DeskAction>; 4]> = smallvec![Effect::emit(event)];
        if let Some(notification) = notification {
            let notifier = Arc::clone(&env.notifier);
            effects.push(Effect::run(move || notifier.notify(notification)));
        }
        effects
    }
}

impl Reducer for DeskReducer {
    type State = DeskState;
    type Action = DeskAction;
    type Environment = DeskEnvironment;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let operation = action.operation();
        match action {
            // ========== Commands ==========
            DeskAction::SubmitRequest {
                correlation_id,
                request_id,
                user_id,
                details,
                purpose,
                items,
            } => {
                let form = SubmissionForm {
                    user_id,
                    details,
                    purpose,
                    items,
                };
                let outcome = lifecycle::submit(state, request_id, form, env.clock.now()).map(
                    |submission| DeskAction::RequestSubmitted {
                        correlation_id,
                        request: submission.request,
                        user: submission.user,
                    },
                );
                Self::conclude(correlation_id, operation, outcome, env)
            },

            DeskAction::Approve {
                correlation_id,
                request_id,
            } => {
                let outcome =
                    lifecycle::approve(state, &request_id, env.advisor.as_ref(), env.clock.now())
                        .map(|approval| DeskAction::RequestApproved {
                            correlation_id,
                            request: approval.request,
                            components: approval.components,
                        });
                Self::conclude(correlation_id, operation, outcome, env)
            },

            DeskAction::Reject {
                correlation_id,
                request_id,
            } => {
                let outcome = lifecycle::reject(state, &request_id).map(|request| {
                    DeskAction::RequestRejected {
                        correlation_id,
                        request,
                    }
                });
                Self::conclude(correlation_id, operation, outcome, env)
            },

            DeskAction::RegisterReturn {
                correlation_id,
                request_id,
                component_id,
                quantity,
            } => {
                let outcome =
                    lifecycle::register_return(state, &request_id, &component_id, quantity).map(
                        |receipt| DeskAction::ReturnRegistered {
                            correlation_id,
                            request: receipt.request,
                            component: receipt.component,
                            quantity,
                        },
                    );
                Self::conclude(correlation_id, operation, outcome, env)
            },

            DeskAction::AddComponent {
                correlation_id,
                component,
            } => {
                let outcome = Self::add_component(state, component).map(|component| {
                    DeskAction::ComponentAdded {
                        correlation_id,
                        component,
                    }
                });
                Self::conclude(correlation_id, operation, outcome, env)
            },

            DeskAction::UpdateComponent {
                correlation_id,
                component,
            } => {
                let outcome = Self::update_component(state, component).map(|component| {
                    DeskAction::ComponentUpdated {
                        correlation_id,
                        component,
                    }
                });
                Self::conclude(correlation_id, operation, outcome, env)
            },

            DeskAction::DeleteComponent {
                correlation_id,
                component_id,
            } => {
                let outcome = Self::delete_component(state, &component_id).map(|component| {
                    DeskAction::ComponentDeleted {
                        correlation_id,
                        component,
                    }
                });
                Self::conclude(correlation_id, operation, outcome, env)
            },

            DeskAction::UpdateUser {
                correlation_id,
                user_id,
                details,
            } => {
                let outcome = Self::update_user(state, &user_id, details)
                    .map(|user| DeskAction::UserUpdated {
                        correlation_id,
                        user,
                    });
                Self::conclude(correlation_id, operation, outcome, env)
            },

            // ========== Outcome events ==========
            DeskAction::RequestSubmitted { .. }
            | DeskAction::RequestApproved { .. }
            | DeskAction::RequestRejected { .. }
            | DeskAction::ReturnRegistered { .. }
            | DeskAction::ComponentAdded { .. }
            | DeskAction::ComponentUpdated { .. }
            | DeskAction::ComponentDeleted { .. }
            | DeskAction::UserUpdated { .. }
            | DeskAction::OperationFailed { .. } => smallvec![Effect::None],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::advisor::StockLevelAdvisor;
    use crate::cart::CartItem;
    use crate::notify::RecordingNotifier;
    use crate::types::{ComponentRequest, RequestId, RequestLine, RequestStatus};
    use stockroom_core::environment::Clock;
    use stockroom_testing::{ReducerTest, assertions, test_clock};

    fn env() -> DeskEnvironment {
        DeskEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(StockLevelAdvisor),
            Arc::new(RecordingNotifier::new()),
        )
    }

    fn arduino(quantity: u32) -> Component {
        Component {
            id: ComponentId::from("1"),
            name: "Arduino Uno".to_string(),
            description: "Microcontroller board based on the ATmega328P.".to_string(),
            quantity,
            icon: "Cpu".to_string(),
        }
    }

    fn pending_request(quantity: u32) -> ComponentRequest {
        ComponentRequest {
            id: RequestId::from("req-1"),
            user_id: UserId::from("u1"),
            user_name: "Alice Johnson".to_string(),
            department: "Electrical Engineering".to_string(),
            year: "3rd".to_string(),
            items: vec![RequestLine {
                component_id: ComponentId::from("1"),
                name: "Arduino Uno".to_string(),
                quantity,
                returned_quantity: 0,
            }],
            purpose: "Plant watering".to_string(),
            status: RequestStatus::Pending,
            created_at: test_clock().now(),
            approved_at: None,
        }
    }

    fn state(stock: u32, requested: u32) -> DeskState {
        let mut state = DeskState::with_components([arduino(stock)]);
        state.requests.insert(pending_request(requested));
        state
    }

    #[test]
    fn approve_emits_outcome_and_notification() {
        ReducerTest::new(DeskReducer::new())
            .with_env(env())
            .given_state(state(25, 2))
            .when_action(DeskAction::Approve {
                correlation_id: CorrelationId::new(),
                request_id: RequestId::from("req-1"),
            })
            .then_state(|state| {
                assert_eq!(state.catalog.get(&ComponentId::from("1")).unwrap().quantity, 23);
                let request = state.requests.get(&RequestId::from("req-1")).unwrap();
                assert_eq!(request.status, RequestStatus::Approved);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn overdraft_leaves_state_untouched() {
        ReducerTest::new(DeskReducer::new())
            .with_env(env())
            .given_state(state(5, 10))
            .when_action(DeskAction::Approve {
                correlation_id: CorrelationId::new(),
                request_id: RequestId::from("req-1"),
            })
            .then_state(|state| {
                assert_eq!(state.catalog.get(&ComponentId::from("1")).unwrap().quantity, 5);
                let request = state.requests.get(&RequestId::from("req-1")).unwrap();
                assert_eq!(request.status, RequestStatus::Pending);
                assert_eq!(request.approved_at, None);
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 2))
            .run();
    }

    #[test]
    fn second_reject_changes_nothing() {
        let reject = || DeskAction::Reject {
            correlation_id: CorrelationId::new(),
            request_id: RequestId::from("req-1"),
        };

        ReducerTest::new(DeskReducer::new())
            .with_env(env())
            .given_state(state(25, 2))
            .given_actions([reject()])
            .when_action(reject())
            .then_state(|state| {
                let request = state.requests.get(&RequestId::from("req-1")).unwrap();
                assert_eq!(request.status, RequestStatus::Rejected);
                assert_eq!(state.catalog.get(&ComponentId::from("1")).unwrap().quantity, 25);
            })
            .run();
    }

    #[test]
    fn outcome_events_are_no_ops() {
        ReducerTest::new(DeskReducer::new())
            .with_env(env())
            .given_state(state(25, 2))
            .when_action(DeskAction::ComponentAdded {
                correlation_id: CorrelationId::new(),
                component: arduino(99),
            })
            .then_state(|state| {
                assert_eq!(state.catalog.get(&ComponentId::from("1")).unwrap().quantity, 25);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn submit_creates_pending_request_and_user() {
        ReducerTest::new(DeskReducer::new())
            .with_env(env())
            .given_state(DeskState::with_components([arduino(25)]))
            .when_action(DeskAction::SubmitRequest {
                correlation_id: CorrelationId::new(),
                request_id: RequestId::from("req-9"),
                user_id: UserId::from("u2"),
                details: UserDetails {
                    name: "Bob Williams".to_string(),
                    email: "bob@example.edu".to_string(),
                    department: "Computer Science".to_string(),
                    year: "2nd".to_string(),
                },
                purpose: "Robot arm".to_string(),
                items: vec![CartItem::new("1", 2)],
            })
            .then_state(|state| {
                let request = state.requests.get(&RequestId::from("req-9")).unwrap();
                assert_eq!(request.status, RequestStatus::Pending);
                assert_eq!(request.user_name, "Bob Williams");
                assert!(state.users.get(&UserId::from("u2")).is_some());
                assert_eq!(state.catalog.get(&ComponentId::from("1")).unwrap().quantity, 25);
            })
            .run();
    }

    #[test]
    fn catalog_admin_validates_input() {
        let mut state = DeskState::with_components([arduino(25)]);

        let mut blank = arduino(3);
        blank.name = "  ".to_string();
        assert!(matches!(
            DeskReducer::update_component(&mut state, blank),
            Err(LifecycleError::Validation(_))
        ));
        assert!(matches!(
            DeskReducer::add_component(&mut state, arduino(3)),
            Err(LifecycleError::Validation(_))
        ));
        assert_eq!(
            DeskReducer::delete_component(&mut state, &ComponentId::from("9")),
            Err(LifecycleError::not_found(Entity::Component, "9"))
        );
        let deleted = DeskReducer::delete_component(&mut state, &ComponentId::from("1")).unwrap();
        assert_eq!(deleted.quantity, 25);
        assert!(state.catalog.is_empty());
    }

    #[test]
    fn notification_texts_follow_the_outcome() {
        let event = DeskAction::ReturnRegistered {
            correlation_id: CorrelationId::new(),
            request: pending_request(4),
            component: arduino(14),
            quantity: 4,
        };
        let notification = DeskReducer::success_notification(&event).unwrap();
        assert_eq!(notification.title, "Return Processed");
        assert_eq!(notification.message, "4 x Arduino Uno returned to inventory.");
    }
}
