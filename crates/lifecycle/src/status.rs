use serde::{Deserialize, Serialize};

/// Closed status enumeration driving a record's lifecycle.
///
/// Implementors provide the full variant list (the aggregator reports a count
/// for every status, including zero), the transition allow-list, and the
/// terminal/revenue classification used by the stats pipeline.
pub trait StatusModel:
    Copy + Eq + std::hash::Hash + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static
{
    /// Every variant, in display order.
    const ALL: &'static [Self];

    /// Status assigned to a freshly created record.
    const INITIAL: Self;

    fn as_str(self) -> &'static str;

    /// Human-readable label, matched by the free-text filter.
    fn label(self) -> &'static str;

    /// Terminal statuses admit no further transitions.
    fn is_terminal(self) -> bool;

    /// Membership check against the allow-list keyed by the current status.
    fn can_transition_to(self, target: Self) -> bool;

    /// Statuses that carry mandatory side-effect data (e.g. a refund's
    /// reason and amount) are only reachable through their dedicated,
    /// validated request; the plain transition path rejects them.
    fn requires_dedicated_request(self) -> bool {
        false
    }

    /// Whether a record in this status counts toward revenue under the
    /// reversal-excluding policy.
    fn is_revenue_bearing(self) -> bool;
}

/// Order status lifecycle enum.
///
/// Represents the lifecycle of a shop order from checkout through fulfilment:
/// - `Pending`: order placed, not yet picked up by the back office
/// - `Processing`: order being prepared
/// - `Shipped`: order handed to a carrier (tracking info attached here)
/// - `Delivered`: order received by the customer (terminal)
/// - `Cancelled`: order called off before delivery (terminal)
/// - `Refunded`: payment returned after validation (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl StatusModel for OrderStatus {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Refunded,
    ];

    const INITIAL: Self = Self::Pending;

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Refunded => "Refunded",
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Refunded)
    }

    fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Pending, Self::Processing | Self::Shipped | Self::Cancelled)
            | (Self::Processing, Self::Shipped | Self::Cancelled)
            | (Self::Shipped, Self::Delivered) => true,
            // Refunds are reachable from every non-terminal status.
            (from, Self::Refunded) => !from.is_terminal(),
            _ => false,
        }
    }

    fn requires_dedicated_request(self) -> bool {
        matches!(self, Self::Refunded)
    }

    fn is_revenue_bearing(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Refunded)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseStatusError {
    #[error(
        "Invalid order status: '{0}'. Expected one of: pending, processing, shipped, delivered, cancelled, refunded"
    )]
    InvalidOrderStatus(String),
    #[error(
        "Invalid quote status: '{0}'. Expected one of: pending, in_progress, sent, accepted, declined, expired, completed"
    )]
    InvalidQuoteStatus(String),
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            _ => Err(ParseStatusError::InvalidOrderStatus(s.to_string())),
        }
    }
}

/// Quote status lifecycle enum.
///
/// A quote request moves from `Pending` through preparation (`InProgress`),
/// delivery to the customer (`Sent`), and resolution (`Accepted` then
/// `Completed`, or `Declined`/`Expired`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    InProgress,
    Sent,
    Accepted,
    Declined,
    Expired,
    Completed,
}

impl StatusModel for QuoteStatus {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::InProgress,
        Self::Sent,
        Self::Accepted,
        Self::Declined,
        Self::Expired,
        Self::Completed,
    ];

    const INITIAL: Self = Self::Pending;

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Sent => "sent",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
            Self::Completed => "completed",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Sent => "Sent",
            Self::Accepted => "Accepted",
            Self::Declined => "Declined",
            Self::Expired => "Expired",
            Self::Completed => "Completed",
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Declined | Self::Expired | Self::Completed)
    }

    fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Pending, Self::InProgress)
            | (Self::InProgress, Self::Sent)
            | (Self::Sent, Self::Accepted)
            | (Self::Accepted, Self::Completed) => true,
            (
                Self::Pending | Self::InProgress | Self::Sent,
                Self::Declined | Self::Expired,
            ) => true,
            _ => false,
        }
    }

    fn is_revenue_bearing(self) -> bool {
        !matches!(self, Self::Declined | Self::Expired)
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "sent" => Ok(Self::Sent),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "expired" => Ok(Self::Expired),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseStatusError::InvalidQuoteStatus(s.to_string())),
        }
    }
}
