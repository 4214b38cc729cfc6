use chrono::{DateTime, Utc};
use mindscan_core::{AggregateReport, InferenceOutcome, SentimentLabel};
use std::collections::BTreeMap;

/// Tally outcome labels into a report stamped with the current time.
pub fn aggregate(outcomes: &[InferenceOutcome]) -> AggregateReport {
    aggregate_at(outcomes, Utc::now())
}

/// Tally outcome labels into a report stamped with `generated_at`.
///
/// Every label, `Unknown` included, is present in `counts`, and each outcome
/// contributes exactly one count.
pub fn aggregate_at(outcomes: &[InferenceOutcome], generated_at: DateTime<Utc>) -> AggregateReport {
    let mut counts: BTreeMap<SentimentLabel, usize> =
        SentimentLabel::ALL.iter().map(|label| (*label, 0)).collect();

    for outcome in outcomes {
        *counts.entry(outcome.label).or_insert(0) += 1;
    }

    AggregateReport {
        counts,
        total_analyzed: outcomes.len(),
        generated_at,
    }
}
