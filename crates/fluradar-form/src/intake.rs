//! Record loading for the intake page.
//!
//! A fetch happens only when both a token and an observation location are
//! given; the token is passed on untouched. Any fetch failure degrades to
//! an empty field set so the form stays usable.

use fluradar_domain::{extract_with, CanonicalFieldSet, DuplicatePolicy, RecordSource};
use tracing::{info, warn};

/// Fetch and extract the record at `location`
///
/// Returns `None` when no fetch was requested, and an empty set when the
/// fetch failed.
pub async fn load_fields<R>(
    source: &R,
    token: &str,
    location: &str,
    policy: DuplicatePolicy,
) -> Option<CanonicalFieldSet>
where
    R: RecordSource + Sync,
{
    if token.is_empty() || location.is_empty() {
        return None;
    }

    match source.fetch(token, location).await {
        Ok(record) => {
            let fields = extract_with(&record, policy);
            info!(
                location,
                components = record.len(),
                fields = fields.len(),
                "Loaded patient record"
            );
            Some(fields)
        }
        Err(e) => {
            warn!(location, error = %e, "Record fetch failed, continuing without data");
            Some(CanonicalFieldSet::new())
        }
    }
}
