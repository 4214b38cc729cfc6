//! PDF export of an analysis run.
//!
//! Layout is computed first as plain data ([`ReportLayout`]) and then handed to
//! the renderer, so pagination can be checked without reading PDF bytes.

pub mod layout;
pub mod render;

pub use layout::{wrap_text, Page, PlacedLine, ReportLayout, REPORT_TITLE};
pub use render::render_pdf;

use mindscan_core::{CoreError, ExportError, InferenceOutcome, Post};
use std::path::Path;
use tracing::info;

/// Render posts and their outcomes into PDF bytes.
///
/// `outcomes` may be empty, in which case sections carry no analysis block.
/// Otherwise it must hold exactly one outcome per post.
pub fn export(posts: &[Post], outcomes: &[InferenceOutcome]) -> Result<Vec<u8>, CoreError> {
    if !outcomes.is_empty() && outcomes.len() != posts.len() {
        return Err(ExportError::MisalignedOutcomes {
            posts: posts.len(),
            outcomes: outcomes.len(),
        }
        .into());
    }

    let layout = ReportLayout::build(posts, outcomes);
    let bytes = render_pdf(&layout, REPORT_TITLE)?;
    info!(
        "Rendered report: {} posts on {} pages ({} bytes)",
        posts.len(),
        layout.page_count(),
        bytes.len()
    );
    Ok(bytes)
}

/// Render and write the report to `path`.
pub fn export_to_file(
    posts: &[Post],
    outcomes: &[InferenceOutcome],
    path: &Path,
) -> Result<(), CoreError> {
    let bytes = export(posts, outcomes)?;
    std::fs::write(path, bytes)?;
    info!("Report saved to {}", path.display());
    Ok(())
}
