use crate::api::bovada_api::{BovadaApiResponse, BovadaOutcome, TextOrNumber};
use crate::error::{PropsError, Result};
use crate::models::{BetData, BetOutcome};
use tracing::debug;

/// Bets pulled out of one response document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedResponse {
    pub bets: Vec<BetData>,
    pub skipped_placeholders: usize,
}

/// Parse a decimal price. Missing, non-numeric and non-finite values are
/// rejected, as is anything below 1.0.
pub fn parse_decimal_odds(value: Option<&TextOrNumber>) -> Option<f64> {
    let odds = match value? {
        TextOrNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        TextOrNumber::Number(n) => *n,
    };

    (odds.is_finite() && odds >= 1.0).then_some(odds)
}

/// Walk events -> display groups -> markets -> outcomes in document order,
/// producing one bet per market.
///
/// Bovada sometimes puts a placeholder market that links to another
/// section; it always has an empty outcomes list. With `skip_placeholders`
/// those are dropped and counted, otherwise they come through as bets
/// with no outcomes.
pub fn flatten_response(
    response: &BovadaApiResponse,
    endpoint: &str,
    skip_placeholders: bool,
) -> Result<FlattenedResponse> {
    let mut flattened = FlattenedResponse::default();

    for list_elem in response {
        for event in &list_elem.events {
            for display_group in &event.display_groups {
                for market in &display_group.markets {
                    if skip_placeholders && market.outcomes.is_empty() {
                        debug!(
                            "Skipping placeholder market '{}' in '{}'",
                            market.description, event.description
                        );
                        flattened.skipped_placeholders += 1;
                        continue;
                    }

                    let outcomes = market
                        .outcomes
                        .iter()
                        .map(|outcome| {
                            build_outcome(outcome).ok_or_else(|| PropsError::Odds {
                                endpoint: endpoint.to_string(),
                                event: event.description.clone(),
                                market: market.description.clone(),
                                outcome: outcome.description.clone(),
                                value: outcome
                                    .price
                                    .as_ref()
                                    .and_then(|p| p.decimal.as_ref())
                                    .map(|d| d.to_string()),
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;

                    flattened.bets.push(BetData {
                        event: event.description.clone(),
                        desc: market.description.clone(),
                        outcomes,
                    });
                }
            }
        }
    }

    Ok(flattened)
}

fn build_outcome(outcome: &BovadaOutcome) -> Option<BetOutcome> {
    let price = outcome.price.as_ref()?;
    let odds = parse_decimal_odds(price.decimal.as_ref())?;

    let line = price
        .handicap
        .as_ref()
        .map(|h| h.to_string())
        .filter(|h| !h.is_empty());

    Some(BetOutcome {
        desc: outcome.description.clone(),
        odds,
        line,
    })
}
