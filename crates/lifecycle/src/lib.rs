//! Order/quote lifecycle core for the ChezFlora back office.
//!
//! Pure, synchronous domain logic: the status state machine, validated
//! transitions with append-only history, stable record filtering, summary
//! statistics and CSV export. Persistence and notifications live in the
//! service crate on top of this one.

use serde::{Deserialize, Serialize};

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod range;
pub mod record;
pub mod status;
pub mod transition;

pub use aggregate::{
    DailySales, ProductSales, RevenuePolicy, Stats, StatsConfig, StatusCount, aggregate,
};
pub use export::to_csv;
pub use filter::FilterSpec;
pub use range::{DateRange, QuickRange};
pub use record::{
    Address, Customer, LineItem, Record, RecordError, RecordSeed, StatusEntry, Tracking,
};
pub use status::{OrderStatus, ParseStatusError, QuoteStatus, StatusModel};
pub use transition::{OrderTransition, TransitionError};

/// Unique, immutable record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

pub type OrderRecord = Record<OrderStatus>;
pub type QuoteRecord = Record<QuoteStatus>;
