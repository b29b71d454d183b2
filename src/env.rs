use std::time::Duration;

use clap::Parser;
use tracing::Level;

use chezflora_lifecycle::{RevenuePolicy, StatsConfig};

#[derive(clap::ValueEnum, Debug, Clone)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&LogLevel> for Level {
    fn from(log_level: &LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum RevenueMode {
    /// Count every record toward revenue.
    Gross,
    /// Skip cancelled/refunded orders and declined/expired quotes.
    ExcludeReversed,
}

impl From<RevenueMode> for RevenuePolicy {
    fn from(mode: RevenueMode) -> Self {
        match mode {
            RevenueMode::Gross => Self::Gross,
            RevenueMode::ExcludeReversed => Self::ExcludeReversed,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct Env {
    #[clap(long, env, default_value = "info")]
    pub log_level: LogLevel,
    /// Seconds to wait for the record store before reporting a persistence
    /// timeout
    #[clap(long, env, default_value = "10")]
    pub persist_timeout_secs: u64,
    /// How many products the statistics report
    #[clap(long, env, default_value = "5")]
    pub top_products: usize,
    #[clap(long, env, default_value = "exclude-reversed")]
    pub revenue_mode: RevenueMode,
    /// Bound on the retained notification log; oldest entries are evicted
    #[clap(long, env, default_value = "100")]
    pub notification_capacity: usize,
}

impl Env {
    pub const fn persist_timeout(&self) -> Duration {
        Duration::from_secs(self.persist_timeout_secs)
    }

    pub fn stats_config(&self) -> StatsConfig {
        StatsConfig {
            revenue_policy: self.revenue_mode.into(),
            top_products: self.top_products,
            period: None,
        }
    }
}

pub fn setup_tracing(env: &Env) {
    let level: Level = (&env.log_level).into();
    let default_filter = format!("chezflora_orders={level},chezflora_lifecycle={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .compact()
        .init();
}
