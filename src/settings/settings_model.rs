use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Configuration surface of the data-collection core.
///
/// Every policy value the jobs depend on lives here so deployments can
/// tune them without touching code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectorSettings {
    /// Local-currency units per USD used when the FX provider is
    /// unreachable. A stale-but-present valuation is preferred to none.
    pub fallback_fx_rate: Decimal,
    /// Upper bound on any single market-data-provider call, so one
    /// unreachable provider cannot stall a whole drain loop.
    pub provider_timeout_secs: u64,
    /// Age after which a cached current price is considered stale and
    /// re-fetched on the next read.
    pub price_ttl_secs: u64,
    /// Separate, longer window for pruning terminal run and job rows.
    /// `None` keeps the audit trail forever.
    pub audit_retention_days: Option<i64>,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            fallback_fx_rate: dec!(7.2),
            provider_timeout_secs: 30,
            price_ttl_secs: 3600,
            audit_retention_days: None,
        }
    }
}
