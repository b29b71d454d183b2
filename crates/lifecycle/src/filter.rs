use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::status::StatusModel;

/// Declarative predicate set narrowing a record collection.
///
/// Every field is optional; an absent field means "no constraint", so the
/// default spec matches everything. Supplied predicates are ANDed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec<S: StatusModel> {
    /// Matching statuses; empty means no status filtering.
    pub statuses: Vec<S>,
    /// Inclusive lower bound on `created_at`.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub date_to: Option<DateTime<Utc>>,
    /// Inclusive lower bound on `total`.
    pub min_amount: Option<Decimal>,
    /// Inclusive upper bound on `total`.
    pub max_amount: Option<Decimal>,
    /// Case-insensitive substring over id, customer name, customer email and
    /// status label; empty matches everything.
    pub query: Option<String>,
}

impl<S: StatusModel> Default for FilterSpec<S> {
    fn default() -> Self {
        Self {
            statuses: Vec::new(),
            date_from: None,
            date_to: None,
            min_amount: None,
            max_amount: None,
            query: None,
        }
    }
}

impl<S: StatusModel> FilterSpec<S> {
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = S>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.date_from = Some(from);
        self
    }

    pub fn until(mut self, to: DateTime<Utc>) -> Self {
        self.date_to = Some(to);
        self
    }

    /// Date-only upper bound, widened to the end of that day (23:59:59.999).
    pub fn until_day(mut self, day: NaiveDate) -> Self {
        self.date_to = day
            .and_hms_milli_opt(23, 59, 59, 999)
            .map(|dt| dt.and_utc());
        self
    }

    pub fn min_amount(mut self, amount: Decimal) -> Self {
        self.min_amount = Some(amount);
        self
    }

    pub fn max_amount(mut self, amount: Decimal) -> Self {
        self.max_amount = Some(amount);
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Whether a single record satisfies every supplied predicate.
    pub fn matches(&self, record: &Record<S>) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&record.status) {
            return false;
        }
        if self.date_from.is_some_and(|from| record.created_at < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| record.created_at > to) {
            return false;
        }
        if self.min_amount.is_some_and(|min| record.total < min) {
            return false;
        }
        if self.max_amount.is_some_and(|max| record.total > max) {
            return false;
        }
        if let Some(query) = self.query.as_deref() {
            if !query_matches(query, record) {
                return false;
            }
        }
        true
    }

    /// Stable filter: keeps matching records in their original relative
    /// order, never mutating the input.
    pub fn filter(&self, records: &[Record<S>]) -> Vec<Record<S>> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

fn query_matches<S: StatusModel>(query: &str, record: &Record<S>) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [
        record.id.0.as_str(),
        record.customer.name.as_str(),
        record.customer.email.as_str(),
        record.status.label(),
    ]
    .iter()
    .any(|haystack| haystack.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::record::{Customer, LineItem, RecordSeed, StatusEntry};
    use crate::status::OrderStatus;

    fn order(
        id: &str,
        name: &str,
        status: OrderStatus,
        total_eur: Decimal,
        created: DateTime<Utc>,
    ) -> Record<OrderStatus> {
        let seed = RecordSeed::new(
            id,
            Customer {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            },
            vec![LineItem {
                name: "Bouquet".to_string(),
                quantity: 1,
                unit_price: total_eur,
            }],
        );
        let mut record = Record::create(seed, created).unwrap();
        if status != OrderStatus::Pending {
            record.status = status;
            record.status_history.push(StatusEntry {
                status,
                date: created,
                notes: None,
            });
        }
        record
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 10, 0, 0).unwrap()
    }

    fn fixture() -> Vec<Record<OrderStatus>> {
        vec![
            order("A", "Claire Fontaine", OrderStatus::Pending, dec!(100), day(1)),
            order("B", "Hugo Martin", OrderStatus::Delivered, dec!(200), day(2)),
            order("C", "Lina Dubois", OrderStatus::Cancelled, dec!(50), day(3)),
            order("D", "Hugo Petit", OrderStatus::Delivered, dec!(175), day(4)),
        ]
    }

    fn ids(records: &[Record<OrderStatus>]) -> Vec<&str> {
        records.iter().map(|r| r.id.0.as_str()).collect()
    }

    #[test]
    fn test_default_spec_is_identity() {
        let records = fixture();
        let filtered = FilterSpec::default().filter(&records);
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_status_filter() {
        let records = fixture();
        let filtered = FilterSpec::default()
            .with_statuses([OrderStatus::Delivered])
            .filter(&records);
        assert_eq!(ids(&filtered), vec!["B", "D"]);
    }

    #[test]
    fn test_min_amount_is_inclusive() {
        let records = fixture();
        let filtered = FilterSpec::default().min_amount(dec!(150)).filter(&records);
        assert_eq!(ids(&filtered), vec!["B", "D"]);

        let filtered = FilterSpec::default().min_amount(dec!(175)).filter(&records);
        assert_eq!(ids(&filtered), vec!["B", "D"]);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let records = fixture();
        let filtered = FilterSpec::default()
            .since(day(2))
            .until(day(3))
            .filter(&records);
        assert_eq!(ids(&filtered), vec!["B", "C"]);
    }

    #[test]
    fn test_until_day_means_end_of_day() {
        let records = fixture();
        // Record B was created at 10:00 on Jan 2; a date-only bound on Jan 2
        // must still include it.
        let filtered = FilterSpec::default()
            .until_day(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
            .filter(&records);
        assert_eq!(ids(&filtered), vec!["A", "B"]);
    }

    #[test]
    fn test_query_matches_id_name_email_and_label() {
        let records = fixture();

        let by_id = FilterSpec::default().query("b").filter(&records);
        assert!(by_id.iter().any(|r| r.id.0 == "B"));

        let by_name = FilterSpec::default().query("hugo").filter(&records);
        assert_eq!(ids(&by_name), vec!["B", "D"]);

        let by_email = FilterSpec::default()
            .query("claire.fontaine@")
            .filter(&records);
        assert_eq!(ids(&by_email), vec!["A"]);

        let by_label = FilterSpec::default().query("DELIVERED").filter(&records);
        assert_eq!(ids(&by_label), vec!["B", "D"]);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let records = fixture();
        let filtered = FilterSpec::default().query("   ").filter(&records);
        assert_eq!(filtered.len(), records.len());
    }

    #[test]
    fn test_predicates_and_compose() {
        let records = fixture();
        let combined = FilterSpec::default()
            .with_statuses([OrderStatus::Delivered])
            .min_amount(dec!(180))
            .filter(&records);

        let sequential = FilterSpec::default().min_amount(dec!(180)).filter(
            &FilterSpec::default()
                .with_statuses([OrderStatus::Delivered])
                .filter(&records),
        );

        assert_eq!(combined, sequential);
        assert_eq!(ids(&combined), vec!["B"]);
    }

    proptest! {
        /// Filters compose: one spec with two predicates equals applying the
        /// predicates one after the other, regardless of the input set.
        #[test]
        fn prop_filters_compose(
            totals in proptest::collection::vec(0u32..500, 0..20),
            statuses in proptest::collection::vec(0usize..6, 0..20),
            min in 0u32..500,
            wanted in 0usize..6,
        ) {
            let records: Vec<Record<OrderStatus>> = totals
                .iter()
                .zip(statuses.iter().chain(std::iter::repeat(&0)))
                .enumerate()
                .map(|(i, (total, status_idx))| {
                    order(
                        &format!("ORD-{i}"),
                        "Prop Customer",
                        OrderStatus::ALL[*status_idx],
                        Decimal::from(*total),
                        day(1),
                    )
                })
                .collect();

            let status = OrderStatus::ALL[wanted];
            let combined = FilterSpec::default()
                .with_statuses([status])
                .min_amount(Decimal::from(min))
                .filter(&records);

            let sequential = FilterSpec::default()
                .min_amount(Decimal::from(min))
                .filter(&FilterSpec::default().with_statuses([status]).filter(&records));

            prop_assert_eq!(combined, sequential);
        }

        /// The default spec is the identity on membership and order.
        #[test]
        fn prop_default_spec_is_identity(totals in proptest::collection::vec(0u32..500, 0..20)) {
            let records: Vec<Record<OrderStatus>> = totals
                .iter()
                .enumerate()
                .map(|(i, total)| {
                    order(
                        &format!("ORD-{i}"),
                        "Prop Customer",
                        OrderStatus::Pending,
                        Decimal::from(*total),
                        day(1),
                    )
                })
                .collect();

            prop_assert_eq!(FilterSpec::default().filter(&records), records);
        }
    }
}
