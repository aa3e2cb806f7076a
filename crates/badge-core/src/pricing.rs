use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{PriceTier, PricingConfig};

/// How a session turns designs into badges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Every design is its own badge.
    #[default]
    Personal,
    /// One design printed `replication_count` times.
    Event,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Personal => write!(f, "Personal"),
            Self::Event => write!(f, "Event"),
        }
    }
}

/// Aggregate handed to checkout. Always derived, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub mode: SessionMode,
    pub quantity: u32,
    pub price_per_unit_cents: u64,
    pub total_cents: u64,
    pub is_valid: bool,
}

/// Unit price for a personal order of `quantity` badges.
///
/// Picks the tier with the largest minimum not above `quantity`; quantities
/// below the first tier use the first tier's price.
pub fn personal_unit_price(tiers: &[PriceTier], quantity: u32) -> u64 {
    tiers
        .iter()
        .take_while(|t| t.min_quantity <= quantity.max(1))
        .last()
        .or_else(|| tiers.first())
        .map(|t| t.unit_price_cents)
        .unwrap_or(0)
}

/// Price a session from its mode, non-empty design count and replication count.
pub fn summarize(
    mode: SessionMode,
    non_empty_designs: u32,
    replication_count: u32,
    pricing: &PricingConfig,
) -> OrderSummary {
    let (quantity, price_per_unit_cents, is_valid) = match mode {
        SessionMode::Personal => (
            non_empty_designs,
            personal_unit_price(&pricing.personal_tiers, non_empty_designs),
            non_empty_designs >= 1,
        ),
        SessionMode::Event => {
            let has_design = non_empty_designs >= 1;
            (
                if has_design { replication_count } else { 0 },
                pricing.event_price_cents,
                has_design && replication_count >= pricing.event_minimum,
            )
        }
    };
    OrderSummary {
        mode,
        quantity,
        price_per_unit_cents,
        total_cents: quantity as u64 * price_per_unit_cents,
        is_valid,
    }
}

/// Render cents as a decimal amount, e.g. `2500` -> `"25.00"`.
pub fn format_cents(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}
