//! Canonical domain types for Market Mood.
//!
//! All models validate their invariants at construction time and carry full
//! serde support; the serialized forms are part of the on-disk fallback
//! cache contract.

mod models;
mod timestamp;

pub use models::{
    BitcoinQuote, CoinMarketEntry, ComponentBreakdown, ComponentKind, ComponentTerm,
    GlobalMarketStats, MarketSnapshot, RiskScoreResult, RiskStatus, SentimentReading, TopMovers,
    MIN_MOVER_MARKET_CAP_USD, MOVERS_PER_SIDE,
};
pub use timestamp::UtcDateTime;
