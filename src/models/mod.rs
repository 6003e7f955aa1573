use serde::{Deserialize, Serialize};

/// One side of a proposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetOutcome {
    pub desc: String,
    pub odds: f64, // Decimal odds, always >= 1.0
    pub line: Option<String>, // Handicap / threshold, never an empty string
}

/// A single market flattened out of the provider tree, tagged with its event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetData {
    pub event: String,
    pub desc: String,
    pub outcomes: Vec<BetOutcome>,
}

impl BetData {
    /// Spread or total for the whole bet, taken from the first outcome
    pub fn headline_line(&self) -> Option<&str> {
        self.outcomes.first().and_then(|o| o.line.as_deref())
    }
}
