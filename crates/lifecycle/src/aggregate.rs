use std::collections::HashMap;

use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::range::DateRange;
use crate::record::Record;
use crate::status::StatusModel;

/// Which records count toward revenue figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenuePolicy {
    /// Every record counts, whatever its status.
    Gross,
    /// Cancelled/refunded orders (declined/expired quotes) are excluded.
    #[default]
    ExcludeReversed,
}

impl RevenuePolicy {
    fn includes<S: StatusModel>(self, status: S) -> bool {
        match self {
            Self::Gross => true,
            Self::ExcludeReversed => status.is_revenue_bearing(),
        }
    }
}

pub const DEFAULT_TOP_PRODUCTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsConfig {
    pub revenue_policy: RevenuePolicy,
    /// How many entries `top_products` reports.
    pub top_products: usize,
    /// Period for the daily sales series; when absent the series spans the
    /// first to the last `created_at` of the input.
    pub period: Option<DateRange>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            revenue_policy: RevenuePolicy::default(),
            top_products: DEFAULT_TOP_PRODUCTS,
            period: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount<S> {
    pub status: S,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub name: String,
    pub quantity: u64,
}

/// Summary statistics over a (usually pre-filtered) record collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats<S: StatusModel> {
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub avg_order_value: Decimal,
    /// One entry per status, in declaration order, zero counts included.
    pub orders_by_status: Vec<StatusCount<S>>,
    /// One entry per calendar day of the period, ascending, no gaps.
    pub daily_sales: Vec<DailySales>,
    /// Top-N products by aggregate quantity, ties broken by name.
    pub top_products: Vec<ProductSales>,
}

/// Computes summary statistics; pure and safe to recompute from the same
/// snapshot any number of times.
pub fn aggregate<S: StatusModel>(records: &[Record<S>], config: &StatsConfig) -> Stats<S> {
    let total_orders = records.len() as u64;

    let total_revenue: Decimal = records
        .iter()
        .filter(|r| config.revenue_policy.includes(r.status))
        .map(|r| r.total)
        .sum();

    // Average over all records, not just revenue-bearing ones; guarded
    // against the empty collection.
    let avg_order_value = if total_orders == 0 {
        Decimal::ZERO
    } else {
        total_revenue
            .checked_div(Decimal::from(total_orders))
            .unwrap_or(Decimal::ZERO)
    };

    Stats {
        total_orders,
        total_revenue,
        avg_order_value,
        orders_by_status: count_by_status(records),
        daily_sales: daily_sales(records, config),
        top_products: top_products(records, config.top_products),
    }
}

fn count_by_status<S: StatusModel>(records: &[Record<S>]) -> Vec<StatusCount<S>> {
    let mut counts: HashMap<S, u64> = HashMap::new();
    for record in records {
        *counts.entry(record.status).or_insert(0) += 1;
    }
    S::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: counts.get(status).copied().unwrap_or(0),
        })
        .collect()
}

fn daily_sales<S: StatusModel>(records: &[Record<S>], config: &StatsConfig) -> Vec<DailySales> {
    let Some(period) = config.period.or_else(|| span_of(records)) else {
        return Vec::new();
    };

    let mut by_day: HashMap<NaiveDate, (Decimal, u64)> = HashMap::new();
    for record in records {
        let day = record.created_at.date_naive();
        if !period.contains(day) {
            continue;
        }
        let bucket = by_day.entry(day).or_insert((Decimal::ZERO, 0));
        bucket.1 += 1;
        if config.revenue_policy.includes(record.status) {
            bucket.0 += record.total;
        }
    }

    period
        .days()
        .map(|date| {
            let (revenue, orders) = by_day.get(&date).copied().unwrap_or((Decimal::ZERO, 0));
            DailySales {
                date,
                revenue,
                orders,
            }
        })
        .collect()
}

fn span_of<S: StatusModel>(records: &[Record<S>]) -> Option<DateRange> {
    let (min, max) = records
        .iter()
        .map(|r| r.created_at.date_naive())
        .minmax()
        .into_option()?;
    Some(DateRange::new(min, max))
}

fn top_products<S: StatusModel>(records: &[Record<S>], n: usize) -> Vec<ProductSales> {
    let mut quantities: HashMap<&str, u64> = HashMap::new();
    for item in records.iter().flat_map(|r| r.items.iter()) {
        *quantities.entry(item.name.as_str()).or_insert(0) += u64::from(item.quantity);
    }
    quantities
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .take(n)
        .map(|(name, quantity)| ProductSales {
            name: name.to_string(),
            quantity,
        })
        .collect()
}
