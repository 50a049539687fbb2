use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// Market-cap floor for a coin to qualify as a top mover (USD).
pub const MIN_MOVER_MARKET_CAP_USD: f64 = 100_000_000.0;

/// Number of gainers and losers kept on each side of the movers view.
pub const MOVERS_PER_SIDE: usize = 4;

/// One reading of the sentiment index, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    /// Index value on the provider's 0-100 scale.
    pub value: u8,
    /// Provider classification label, e.g. "Extreme Fear".
    pub classification: String,
    pub timestamp: UtcDateTime,
    /// Most recent daily values, newest first (current value included).
    pub history_7d: Vec<u8>,
}

impl SentimentReading {
    pub fn new(
        value: u8,
        classification: impl Into<String>,
        timestamp: UtcDateTime,
        history_7d: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::SentimentOutOfRange {
                value: i64::from(value),
            });
        }
        for &day in &history_7d {
            if day > 100 {
                return Err(ValidationError::SentimentOutOfRange {
                    value: i64::from(day),
                });
            }
        }

        Ok(Self {
            value,
            classification: classification.into(),
            timestamp,
            history_7d,
        })
    }
}

/// Global market statistics snapshot at a single point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMarketStats {
    pub total_market_cap_usd: f64,
    pub total_volume_24h_usd: f64,
    pub btc_dominance_pct: f64,
    pub eth_dominance_pct: f64,
    pub active_cryptocurrencies: u32,
}

impl GlobalMarketStats {
    pub fn new(
        total_market_cap_usd: f64,
        total_volume_24h_usd: f64,
        btc_dominance_pct: f64,
        eth_dominance_pct: f64,
        active_cryptocurrencies: u32,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("total_market_cap_usd", total_market_cap_usd)?;
        validate_non_negative("total_volume_24h_usd", total_volume_24h_usd)?;
        validate_non_negative("btc_dominance_pct", btc_dominance_pct)?;
        validate_non_negative("eth_dominance_pct", eth_dominance_pct)?;

        Ok(Self {
            total_market_cap_usd,
            total_volume_24h_usd,
            btc_dominance_pct,
            eth_dominance_pct,
            active_cryptocurrencies,
        })
    }

    /// 24h volume as a percentage of total market cap. `None` when the
    /// market cap is zero (a malformed-but-valid payload corner).
    pub fn volume_to_cap_ratio_pct(&self) -> Option<f64> {
        if self.total_market_cap_usd > 0.0 {
            Some(self.total_volume_24h_usd / self.total_market_cap_usd * 100.0)
        } else {
            None
        }
    }
}

/// Bitcoin spot quote used for the momentum component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinQuote {
    pub price_usd: f64,
    pub volume_24h_usd: f64,
    pub change_24h_pct: f64,
}

impl BitcoinQuote {
    pub fn new(
        price_usd: f64,
        volume_24h_usd: f64,
        change_24h_pct: f64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price_usd", price_usd)?;
        validate_non_negative("volume_24h_usd", volume_24h_usd)?;
        validate_finite("change_24h_pct", change_24h_pct)?;

        Ok(Self {
            price_usd,
            volume_24h_usd,
            change_24h_pct,
        })
    }
}

/// One ranked coin entry from the markets endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMarketEntry {
    pub symbol: String,
    pub name: String,
    pub price_usd: f64,
    /// Absent for freshly listed coins with no 24h of trading yet.
    pub change_24h_pct: Option<f64>,
    pub market_cap_usd: f64,
    pub volume_24h_usd: f64,
}

impl CoinMarketEntry {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        price_usd: f64,
        change_24h_pct: Option<f64>,
        market_cap_usd: f64,
        volume_24h_usd: f64,
    ) -> Result<Self, ValidationError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        validate_non_negative("price_usd", price_usd)?;
        validate_non_negative("market_cap_usd", market_cap_usd)?;
        validate_non_negative("volume_24h_usd", volume_24h_usd)?;
        if let Some(change) = change_24h_pct {
            validate_finite("change_24h_pct", change)?;
        }

        Ok(Self {
            symbol: symbol.to_ascii_uppercase(),
            name: name.into(),
            price_usd,
            change_24h_pct,
            market_cap_usd,
            volume_24h_usd,
        })
    }
}

/// One atomic set of market data fetched together.
///
/// Sections are optional because a cycle may only partially succeed; the
/// fetcher never produces a snapshot with every section missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub sentiment: Option<SentimentReading>,
    pub global: Option<GlobalMarketStats>,
    pub bitcoin: Option<BitcoinQuote>,
    /// Ranked by market cap, up to the top 100.
    pub coins: Vec<CoinMarketEntry>,
    pub fetched_at: UtcDateTime,
    /// True when served from the durable fallback cache rather than any
    /// live API call in the current cycle.
    pub is_stale: bool,
}

impl MarketSnapshot {
    /// Percentage of tracked coins with a positive 24h change.
    /// `None` when the coin list is unavailable.
    pub fn market_breadth_pct(&self) -> Option<f64> {
        let with_change: Vec<f64> = self
            .coins
            .iter()
            .filter_map(|coin| coin.change_24h_pct)
            .collect();
        if with_change.is_empty() {
            return None;
        }

        let positive = with_change.iter().filter(|&&change| change > 0.0).count();
        Some(positive as f64 / with_change.len() as f64 * 100.0)
    }

    pub fn top_movers(&self) -> TopMovers {
        TopMovers::from_coins(&self.coins)
    }
}

/// Derived gainers/losers view over the snapshot's coin list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMovers {
    pub gainers: Vec<CoinMarketEntry>,
    pub losers: Vec<CoinMarketEntry>,
}

impl TopMovers {
    /// Movers are restricted to coins above the market-cap floor so that
    /// thinly traded listings do not dominate the board.
    pub fn from_coins(coins: &[CoinMarketEntry]) -> Self {
        let mut eligible: Vec<&CoinMarketEntry> = coins
            .iter()
            .filter(|coin| {
                coin.market_cap_usd >= MIN_MOVER_MARKET_CAP_USD && coin.change_24h_pct.is_some()
            })
            .collect();

        eligible.sort_by(|a, b| {
            let change_a = a.change_24h_pct.unwrap_or_default();
            let change_b = b.change_24h_pct.unwrap_or_default();
            change_b
                .partial_cmp(&change_a)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let gainers = eligible
            .iter()
            .take(MOVERS_PER_SIDE)
            .map(|coin| (*coin).clone())
            .collect();
        let losers = eligible
            .iter()
            .rev()
            .take(MOVERS_PER_SIDE)
            .map(|coin| (*coin).clone())
            .collect();

        Self { gainers, losers }
    }
}

/// One of the five fixed score bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    ExtremeRiskOff,
    RiskOff,
    Neutral,
    RiskOn,
    ExtremeRiskOn,
}

impl RiskStatus {
    /// Band thresholds: [0,30], (30,45], (45,60], (60,80], (80,100].
    pub fn from_score(score: f64) -> Self {
        if score <= 30.0 {
            Self::ExtremeRiskOff
        } else if score <= 45.0 {
            Self::RiskOff
        } else if score <= 60.0 {
            Self::Neutral
        } else if score <= 80.0 {
            Self::RiskOn
        } else {
            Self::ExtremeRiskOn
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ExtremeRiskOff => "Extreme Risk Off",
            Self::RiskOff => "Risk Off",
            Self::Neutral => "Neutral",
            Self::RiskOn => "Risk On",
            Self::ExtremeRiskOn => "Extreme Risk On",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::ExtremeRiskOff => "Protect capital mode - Market showing extreme weakness",
            Self::RiskOff => "Cautious positioning - Defensive stance recommended",
            Self::Neutral => "Wait for confirmation - No clear directional bias",
            Self::RiskOn => "Constructive conditions - Market showing strength",
            Self::ExtremeRiskOn => "Maximum exposure justified - Strong bullish momentum",
        }
    }
}

impl std::fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Score component identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Sentiment,
    BtcMomentum,
    VolumeHealth,
    MarketBreadth,
}

impl ComponentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::BtcMomentum => "btc_momentum",
            Self::VolumeHealth => "volume_health",
            Self::MarketBreadth => "market_breadth",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weighted term of the composite score, recorded for auditability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTerm {
    pub component: ComponentKind,
    /// Normalized component value on the 0-100 scale.
    pub value: f64,
    /// Effective weight after any missing-component redistribution.
    pub weight: f64,
    pub contribution: f64,
}

/// Per-component audit trail of the weighted formula.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentBreakdown {
    pub terms: Vec<ComponentTerm>,
}

impl ComponentBreakdown {
    pub fn term(&self, component: ComponentKind) -> Option<&ComponentTerm> {
        self.terms.iter().find(|term| term.component == component)
    }
}

/// The composite risk score produced by one calculator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScoreResult {
    /// Always clamped to [0, 100].
    pub score: f64,
    pub status: RiskStatus,
    pub message: String,
    pub computed_at: UtcDateTime,
    pub components: ComponentBreakdown,
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteValue { field })
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NegativeValue { field })
    }
}
