//! Score calculator: deterministic mapping from a [`MarketSnapshot`] to a
//! [`RiskScoreResult`] via a fixed weighted formula.
//!
//! `score = 0.35*F + 0.25*M + 0.20*V + 0.20*B`, every term pre-normalized
//! to 0-100. Missing components are handled by proportional reweighting
//! across the available terms, down to a floor of two; below that the
//! calculator refuses with [`ScoreError::MissingComponents`].

use crate::{
    ComponentBreakdown, ComponentKind, ComponentTerm, MarketSnapshot, RiskScoreResult, RiskStatus,
    ScoreError, UtcDateTime,
};

/// Fixed component weights; they sum to exactly 1.0.
pub const WEIGHT_SENTIMENT: f64 = 0.35;
pub const WEIGHT_BTC_MOMENTUM: f64 = 0.25;
pub const WEIGHT_VOLUME_HEALTH: f64 = 0.20;
pub const WEIGHT_MARKET_BREADTH: f64 = 0.20;

/// BTC 24h change bounds for the momentum normalization: 0% maps to the
/// midpoint (50), the bounds map to 100/0, values beyond them clamp.
pub const MOMENTUM_UPPER_BOUND_PCT: f64 = 5.0;
pub const MOMENTUM_LOWER_BOUND_PCT: f64 = -5.0;

/// Volume/market-cap ratio band considered optimal (component value 100).
pub const VOLUME_OPTIMAL_LOW_PCT: f64 = 5.0;
pub const VOLUME_OPTIMAL_HIGH_PCT: f64 = 6.0;
/// Points lost per percentage point of distance outside the optimal band.
pub const VOLUME_FALLOFF_PER_PCT: f64 = 20.0;

/// Minimum available components before the calculator refuses.
pub const MIN_AVAILABLE_COMPONENTS: usize = 2;

/// Normalize BTC 24h percent change onto 0-100.
pub fn normalize_momentum(change_24h_pct: f64) -> f64 {
    let per_pct = 50.0 / MOMENTUM_UPPER_BOUND_PCT;
    (50.0 + change_24h_pct * per_pct).clamp(0.0, 100.0)
}

/// Normalize the volume/market-cap ratio (in percent) onto 0-100, peaking
/// inside the optimal band and falling off symmetrically outside it.
pub fn normalize_volume_health(ratio_pct: f64) -> f64 {
    let distance = if ratio_pct < VOLUME_OPTIMAL_LOW_PCT {
        VOLUME_OPTIMAL_LOW_PCT - ratio_pct
    } else if ratio_pct > VOLUME_OPTIMAL_HIGH_PCT {
        ratio_pct - VOLUME_OPTIMAL_HIGH_PCT
    } else {
        0.0
    };
    (100.0 - distance * VOLUME_FALLOFF_PER_PCT).clamp(0.0, 100.0)
}

/// Compute the composite risk score for a snapshot.
///
/// Unavailable components drop out and their weight is redistributed
/// proportionally across the remaining ones; the recorded breakdown carries
/// the effective (post-redistribution) weights.
pub fn calculate(snapshot: &MarketSnapshot) -> Result<RiskScoreResult, ScoreError> {
    let candidates: [(ComponentKind, f64, Option<f64>); 4] = [
        (
            ComponentKind::Sentiment,
            WEIGHT_SENTIMENT,
            snapshot.sentiment.as_ref().map(|s| f64::from(s.value)),
        ),
        (
            ComponentKind::BtcMomentum,
            WEIGHT_BTC_MOMENTUM,
            snapshot
                .bitcoin
                .as_ref()
                .map(|btc| normalize_momentum(btc.change_24h_pct)),
        ),
        (
            ComponentKind::VolumeHealth,
            WEIGHT_VOLUME_HEALTH,
            snapshot
                .global
                .as_ref()
                .and_then(|global| global.volume_to_cap_ratio_pct())
                .map(normalize_volume_health),
        ),
        (
            ComponentKind::MarketBreadth,
            WEIGHT_MARKET_BREADTH,
            snapshot.market_breadth_pct(),
        ),
    ];

    let available: Vec<(ComponentKind, f64, f64)> = candidates
        .iter()
        .filter_map(|(kind, weight, value)| value.map(|v| (*kind, *weight, v)))
        .collect();

    if available.len() < MIN_AVAILABLE_COMPONENTS {
        return Err(ScoreError::MissingComponents {
            available: available.len(),
            required: MIN_AVAILABLE_COMPONENTS,
        });
    }

    if available.len() < candidates.len() {
        tracing::info!(
            available = available.len(),
            "scoring with redistributed weights"
        );
    }

    let weight_sum: f64 = available.iter().map(|(_, weight, _)| weight).sum();

    let mut terms = Vec::with_capacity(available.len());
    let mut score = 0.0;
    for (component, weight, value) in available {
        let effective_weight = weight / weight_sum;
        let contribution = value * effective_weight;
        score += contribution;
        terms.push(ComponentTerm {
            component,
            value,
            weight: effective_weight,
            contribution,
        });
    }

    let score = score.clamp(0.0, 100.0);
    let status = RiskStatus::from_score(score);

    Ok(RiskScoreResult {
        score,
        status,
        message: status.message().to_owned(),
        computed_at: UtcDateTime::now(),
        components: ComponentBreakdown { terms },
    })
}
