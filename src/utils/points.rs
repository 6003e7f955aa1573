/// Implied win probability of decimal odds, as a whole percentage
pub fn implied_probability_percent(odds: f64) -> f64 {
    (100.0 / odds).round()
}

/// Points for picking an outcome in the props game: the less likely the
/// outcome, the more it's worth. Always in 1..=99.
///
/// No vig removal across the outcome set; each side is scored on its own.
pub fn odds_to_points(odds: f64) -> u8 {
    let probability = implied_probability_percent(odds).clamp(1.0, 99.0);
    (100.0 - probability) as u8
}
