use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::RecordId;
use crate::status::StatusModel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Carrier handoff details, attached when an order enters `Shipped`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracking {
    pub carrier: String,
    pub tracking_number: String,
    pub tracking_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// One entry of the append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry<S> {
    pub status: S,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// An order or quote tracked through its status lifecycle.
///
/// Orders and quotes are structurally identical; the status enumeration is
/// the only thing that differs, so the record is generic over [`StatusModel`].
///
/// Invariants, upheld by [`Record::create`] and the transition engine:
/// - `status_history` is never empty and its last entry matches `status`
/// - monetary fields are never negative
/// - `total == subtotal + shipping_cost + tax_amount - discount`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<S: StatusModel> {
    pub id: RecordId,
    pub status: S,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status_history: Vec<StatusEntry<S>>,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub tracking: Option<Tracking>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record id must not be empty")]
    EmptyId,
    #[error("negative amount for {field}: {value}")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error("discount exceeds charges: total would be {value}")]
    NegativeTotal { value: Decimal },
}

/// Inputs for creating a record; derived amounts are computed on creation.
#[derive(Debug, Clone)]
pub struct RecordSeed {
    pub id: RecordId,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub shipping_cost: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
}

impl RecordSeed {
    pub fn new(id: impl Into<String>, customer: Customer, items: Vec<LineItem>) -> Self {
        Self {
            id: RecordId(id.into()),
            customer,
            items,
            shipping_cost: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            discount: Decimal::ZERO,
            shipping_address: None,
            billing_address: None,
        }
    }

    pub fn with_charges(mut self, shipping_cost: Decimal, tax_amount: Decimal) -> Self {
        self.shipping_cost = shipping_cost;
        self.tax_amount = tax_amount;
        self
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_shipping_address(mut self, address: Address) -> Self {
        self.shipping_address = Some(address);
        self
    }

    pub fn with_billing_address(mut self, address: Address) -> Self {
        self.billing_address = Some(address);
        self
    }
}

fn non_negative(field: &'static str, value: Decimal) -> Result<Decimal, RecordError> {
    if value < Decimal::ZERO {
        Err(RecordError::NegativeAmount { field, value })
    } else {
        Ok(value)
    }
}

impl<S: StatusModel> Record<S> {
    /// Creates a record in the initial status with a seeded history entry.
    ///
    /// Validates the monetary invariants and derives `subtotal` and `total`
    /// from the line items and charges.
    pub fn create(seed: RecordSeed, now: DateTime<Utc>) -> Result<Self, RecordError> {
        if seed.id.0.trim().is_empty() {
            return Err(RecordError::EmptyId);
        }

        for item in &seed.items {
            non_negative("items.unit_price", item.unit_price)?;
        }
        let shipping_cost = non_negative("shipping_cost", seed.shipping_cost)?;
        let tax_amount = non_negative("tax_amount", seed.tax_amount)?;
        let discount = non_negative("discount", seed.discount)?;

        let subtotal: Decimal = seed.items.iter().map(LineItem::line_total).sum();
        let total = subtotal + shipping_cost + tax_amount - discount;
        if total < Decimal::ZERO {
            return Err(RecordError::NegativeTotal { value: total });
        }

        Ok(Self {
            id: seed.id,
            status: S::INITIAL,
            created_at: now,
            updated_at: now,
            status_history: vec![StatusEntry {
                status: S::INITIAL,
                date: now,
                notes: None,
            }],
            customer: seed.customer,
            items: seed.items,
            subtotal,
            shipping_cost,
            tax_amount,
            discount,
            total,
            shipping_address: seed.shipping_address,
            billing_address: seed.billing_address,
            tracking: None,
        })
    }
}
