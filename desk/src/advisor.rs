//! Overdraft policy consulted for every line of an approval.

use serde::{Deserialize, Serialize};

/// Advisor answer for one line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdraftVerdict {
    /// Approving would push stock below zero
    pub is_overdraft: bool,
    /// Units that could be approved instead
    pub suggested_quantity: Option<u32>,
    /// Human explanation
    pub reason: String,
}

/// Pluggable overdraft policy
///
/// Must be pure: the reducer calls it while holding the state lock.
pub trait OverdraftAdvisor: Send + Sync {
    /// Judge whether `requested` units of `component_name` can come out of
    /// `current` units on the shelf
    fn evaluate(&self, component_name: &str, requested: u32, current: u32) -> OverdraftVerdict;
}

/// Default policy: overdraft iff more is requested than is on the shelf
#[derive(Debug, Clone, Copy, Default)]
pub struct StockLevelAdvisor;

impl OverdraftAdvisor for StockLevelAdvisor {
    fn evaluate(&self, component_name: &str, requested: u32, current: u32) -> OverdraftVerdict {
        if requested > current {
            OverdraftVerdict {
                is_overdraft: true,
                suggested_quantity: Some(current),
                reason: format!(
                    "Approving {requested} x {component_name} would overdraw stock: only {current} available. Approve at most {current}."
                ),
            }
        } else {
            OverdraftVerdict {
                is_overdraft: false,
                suggested_quantity: None,
                reason: format!(
                    "{current} x {component_name} in stock covers the {requested} requested."
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_requests_above_stock() {
        let verdict = StockLevelAdvisor.evaluate("ESP32", 10, 5);
        assert!(verdict.is_overdraft);
        assert_eq!(verdict.suggested_quantity, Some(5));
        assert!(verdict.reason.contains("only 5 available"));
    }

    #[test]
    fn exact_stock_is_not_an_overdraft() {
        let verdict = StockLevelAdvisor.evaluate("Arduino Uno", 25, 25);
        assert!(!verdict.is_overdraft);
        assert_eq!(verdict.suggested_quantity, None);
    }
}
