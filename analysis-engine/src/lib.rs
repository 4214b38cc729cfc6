pub mod aggregate;
pub mod orchestrator;
pub mod parser;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use aggregate::{aggregate, aggregate_at};
pub use orchestrator::InferenceOrchestrator;
pub use parser::{display_text, parse_label, sanitize};
pub use pipeline::{run_analysis, AnalysisRequest, AnalysisRun, RunOutcome};
