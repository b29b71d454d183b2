use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::record::{Record, StatusEntry, Tracking};
use crate::status::{OrderStatus, StatusModel};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
    #[error("invalid refund: {0}")]
    InvalidRefund(String),
}

/// A requested order mutation, validated before anything is applied.
///
/// `Ship`, `Cancel` and `Refund` are the transitions with side effects beyond
/// the status change; everything else goes through `To`.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderTransition {
    To {
        target: OrderStatus,
        notes: Option<String>,
    },
    /// Targets `Shipped` and attaches carrier tracking to the record.
    Ship {
        tracking: Tracking,
        notes: Option<String>,
    },
    /// Targets `Cancelled`; the reason is recorded in the history entry.
    Cancel { reason: Option<String> },
    /// Targets `Refunded`. Requires a non-empty reason and an amount no
    /// greater than the order total.
    Refund { reason: String, amount: Decimal },
}

impl<S: StatusModel> Record<S> {
    /// Validated status transition.
    ///
    /// Returns the updated copy on success; the receiver is never mutated, so
    /// a failed transition is an atomic no-op. On success the target status is
    /// applied, exactly one history entry is appended and `updated_at` is
    /// bumped to `now`.
    ///
    /// Targets carrying mandatory side-effect data (`Refunded`) are rejected
    /// here and must go through their dedicated request, so the validation
    /// cannot be bypassed via the plain path.
    pub fn transition(
        &self,
        target: S,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        if !self.status.can_transition_to(target) {
            return Err(TransitionError::InvalidTransition {
                from: self.status.as_str(),
                to: target.as_str(),
            });
        }
        if target.requires_dedicated_request() {
            return Err(TransitionError::InvalidRefund(format!(
                "status {target} is only reachable through a validated refund request"
            )));
        }
        self.advance(target, notes, now)
    }

    /// Allow-list check plus the status/history/timestamp update. Request
    /// handlers call this after their own validation.
    fn advance(
        &self,
        target: S,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        if !self.status.can_transition_to(target) {
            return Err(TransitionError::InvalidTransition {
                from: self.status.as_str(),
                to: target.as_str(),
            });
        }

        let mut next = self.clone();
        next.status = target;
        next.status_history.push(StatusEntry {
            status: target,
            date: now,
            notes,
        });
        next.updated_at = now;
        Ok(next)
    }
}

impl Record<OrderStatus> {
    /// Applies an order transition request, enforcing the request-specific
    /// rules on top of the allow-list check in [`Record::transition`].
    pub fn apply(
        &self,
        request: OrderTransition,
        now: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        match request {
            OrderTransition::To { target, notes } => self.transition(target, notes, now),
            OrderTransition::Ship { tracking, notes } => {
                let mut next = self.transition(OrderStatus::Shipped, notes, now)?;
                next.tracking = Some(tracking);
                Ok(next)
            }
            OrderTransition::Cancel { reason } => {
                self.transition(OrderStatus::Cancelled, reason, now)
            }
            OrderTransition::Refund { reason, amount } => {
                if reason.trim().is_empty() {
                    return Err(TransitionError::InvalidRefund(
                        "refund requires a non-empty reason".to_string(),
                    ));
                }
                if amount < Decimal::ZERO {
                    return Err(TransitionError::InvalidRefund(format!(
                        "refund amount {amount} is negative"
                    )));
                }
                if amount > self.total {
                    return Err(TransitionError::InvalidRefund(format!(
                        "refund amount {amount} exceeds order total {}",
                        self.total
                    )));
                }
                self.advance(OrderStatus::Refunded, Some(reason), now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::record::{Customer, LineItem, RecordSeed};

    fn pending_order() -> Record<OrderStatus> {
        let seed = RecordSeed::new(
            "ORD-1",
            Customer {
                name: "Claire Fontaine".to_string(),
                email: "claire@example.com".to_string(),
            },
            vec![LineItem {
                name: "Peony bouquet".to_string(),
                quantity: 2,
                unit_price: dec!(24.50),
            }],
        );
        Record::create(seed, Utc::now()).unwrap()
    }

    fn order_in(status: OrderStatus) -> Record<OrderStatus> {
        let mut record = pending_order();
        record.status = status;
        record.status_history.push(StatusEntry {
            status,
            date: Utc::now(),
            notes: None,
        });
        record
    }

    fn test_tracking() -> Tracking {
        Tracking {
            carrier: "Colissimo".to_string(),
            tracking_number: "8R00000001".to_string(),
            tracking_url: None,
        }
    }

    #[test]
    fn test_every_disallowed_pair_fails_and_leaves_record_unchanged() {
        for from in OrderStatus::ALL.iter().copied() {
            let record = order_in(from);
            let before = record.clone();
            for target in OrderStatus::ALL.iter().copied() {
                if from.can_transition_to(target) {
                    continue;
                }
                let err = record.transition(target, None, Utc::now()).unwrap_err();
                assert_eq!(
                    err,
                    TransitionError::InvalidTransition {
                        from: from.as_str(),
                        to: target.as_str(),
                    }
                );
                // Atomic no-op: the source record is untouched.
                assert_eq!(record, before);
            }
        }
    }

    #[test]
    fn test_successful_transition_appends_exactly_one_history_entry() {
        let record = pending_order();
        let now = Utc::now();
        let updated = record
            .transition(OrderStatus::Processing, Some("picked up".to_string()), now)
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Processing);
        assert_eq!(updated.status_history.len(), record.status_history.len() + 1);
        let last = updated.status_history.last().unwrap();
        assert_eq!(last.status, OrderStatus::Processing);
        assert_eq!(last.date, now);
        assert_eq!(last.notes.as_deref(), Some("picked up"));
        assert_eq!(updated.updated_at, now);
        // Input untouched.
        assert_eq!(record.status, OrderStatus::Pending);
    }

    #[test]
    fn test_delivered_cannot_go_back_to_pending() {
        let record = order_in(OrderStatus::Delivered);
        let err = record
            .transition(OrderStatus::Pending, None, Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                from: "delivered",
                to: "pending",
            }
        );
    }

    #[test]
    fn test_ship_attaches_tracking() {
        let record = order_in(OrderStatus::Processing);
        let updated = record
            .apply(
                OrderTransition::Ship {
                    tracking: test_tracking(),
                    notes: None,
                },
                Utc::now(),
            )
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.tracking, Some(test_tracking()));
        assert_eq!(record.tracking, None);
    }

    #[test]
    fn test_plain_transition_cannot_enter_refunded() {
        // Refunds carry mandatory data; the unvalidated path must refuse
        // them even where the allow-list would permit the move.
        for from in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
        ] {
            let record = order_in(from);
            let before = record.clone();
            let err = record
                .transition(OrderStatus::Refunded, None, Utc::now())
                .unwrap_err();
            assert!(matches!(err, TransitionError::InvalidRefund(_)));
            assert_eq!(record, before);
        }
    }

    #[test]
    fn test_to_request_cannot_enter_refunded() {
        let record = order_in(OrderStatus::Processing);
        let err = record
            .apply(
                OrderTransition::To {
                    target: OrderStatus::Refunded,
                    notes: Some("no reason given".to_string()),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidRefund(_)));
    }

    #[test]
    fn test_refund_from_terminal_status_is_invalid_transition() {
        let record = order_in(OrderStatus::Delivered);
        let err = record
            .transition(OrderStatus::Refunded, None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn test_refund_requires_reason() {
        let record = order_in(OrderStatus::Processing);
        let err = record
            .apply(
                OrderTransition::Refund {
                    reason: "   ".to_string(),
                    amount: dec!(10.00),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidRefund(_)));
        assert_eq!(record.status, OrderStatus::Processing);
    }

    #[test]
    fn test_refund_rejects_amount_above_total() {
        let record = order_in(OrderStatus::Processing);
        let err = record
            .apply(
                OrderTransition::Refund {
                    reason: "damaged in transit".to_string(),
                    amount: record.total + dec!(0.01),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidRefund(_)));
    }

    #[test]
    fn test_refund_rejects_negative_amount() {
        let record = order_in(OrderStatus::Pending);
        let err = record
            .apply(
                OrderTransition::Refund {
                    reason: "duplicate charge".to_string(),
                    amount: dec!(-5.00),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidRefund(_)));
    }

    #[test]
    fn test_refund_records_reason_in_history() {
        let record = order_in(OrderStatus::Shipped);
        let updated = record
            .apply(
                OrderTransition::Refund {
                    reason: "wilted on arrival".to_string(),
                    amount: record.total,
                },
                Utc::now(),
            )
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Refunded);
        assert_eq!(
            updated.status_history.last().unwrap().notes.as_deref(),
            Some("wilted on arrival")
        );
    }

    #[test]
    fn test_cancel_accepts_optional_reason() {
        let record = pending_order();
        let updated = record
            .apply(OrderTransition::Cancel { reason: None }, Utc::now())
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Cancelled);
        assert_eq!(updated.status_history.last().unwrap().notes, None);
    }

    #[test]
    fn test_cancel_refused_once_delivered() {
        let record = order_in(OrderStatus::Delivered);
        let err = record
            .apply(
                OrderTransition::Cancel {
                    reason: Some("changed my mind".to_string()),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }
}
