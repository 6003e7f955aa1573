use crate::error::{PropsError, Result};
use crate::models::{BetData, BetOutcome};
use crate::utils::points::odds_to_points;

/// Widest outcome list in the batch; sets the number of "Bet Side" columns
pub fn max_outcomes(bets: &[BetData]) -> usize {
    bets.iter().map(|bet| bet.outcomes.len()).max().unwrap_or(0)
}

pub fn header_row(max_outcomes: usize) -> Vec<String> {
    let mut header = vec!["Event".to_string(), "Bet".to_string()];
    header.extend(std::iter::repeat("Bet Side".to_string()).take(max_outcomes));
    header
}

/// Bet column: market description plus the first outcome's line, if any
pub fn bet_cell(bet: &BetData) -> String {
    match bet.headline_line() {
        Some(line) => format!("{} $$number={}", bet.desc, line),
        None => bet.desc.clone(),
    }
}

/// One side: `desc [$$line={line}] $$odds=<odds> [$$points=<points>]`
pub fn outcome_cell(outcome: &BetOutcome, include_points: bool) -> String {
    let mut parts = vec![outcome.desc.clone()];

    if let Some(line) = &outcome.line {
        parts.push(format!("$$line={{{}}}", line));
    }

    parts.push(format!("$$odds={}", outcome.odds));

    if include_points {
        parts.push(format!("$$points={}", odds_to_points(outcome.odds)));
    }

    parts.join(" ")
}

/// Every row gets exactly `max_outcomes` side cells, short rows are padded
/// with empty cells.
pub fn bet_row(bet: &BetData, max_outcomes: usize, include_points: bool) -> Vec<String> {
    let mut row = Vec::with_capacity(2 + max_outcomes);
    row.push(bet.event.clone());
    row.push(bet_cell(bet));
    row.extend(
        bet.outcomes
            .iter()
            .map(|outcome| outcome_cell(outcome, include_points)),
    );
    row.resize(2 + max_outcomes, String::new());
    row
}

/// Render the whole table in memory. Fields holding commas, quotes or
/// newlines are quoted by the CSV writer.
pub fn render_csv(bets: &[BetData], include_points: bool) -> Result<Vec<u8>> {
    let max_outcomes = max_outcomes(bets);

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header_row(max_outcomes))?;
    for bet in bets {
        writer.write_record(bet_row(bet, max_outcomes, include_points))?;
    }

    writer
        .into_inner()
        .map_err(|e| PropsError::Csv(e.into_error().into()))
}
