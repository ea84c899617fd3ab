//! Attachment matching
//!
//! Binds uploaded document names to customer records by case-insensitive
//! exact filename equality. Only names are compared; contents are never read.

use crate::types::CustomerRecord;
use tracing::{debug, info};

/// Bind available file names to the records expecting them
///
/// For each record, the first name in `available` that equals its expected
/// attachment name (ignoring case) is bound. Records with no match keep
/// whatever attachment they already had: an existing binding is never
/// cleared. Running the matcher again with the same names yields the same
/// bindings.
///
/// # Returns
///
/// The number of records whose binding changed, i.e. records that were newly
/// matched or re-bound to a differently named file. Zero matches is not an
/// error.
pub fn match_attachments<S: AsRef<str>>(records: &mut [CustomerRecord], available: &[S]) -> usize {
    let lowered: Vec<String> = available.iter().map(|name| name.as_ref().to_lowercase()).collect();

    let mut matched = 0usize;
    let mut newly_bound = 0usize;

    for record in records.iter_mut() {
        let expected = record.expected_attachment.to_lowercase();
        let Some(position) = lowered.iter().position(|name| *name == expected) else {
            continue;
        };
        matched += 1;

        let name = available[position].as_ref();
        if record.attachment.as_deref() != Some(name) {
            debug!(record = %record.id, attachment = name, "bound attachment");
            record.attachment = Some(name.to_string());
            newly_bound += 1;
        }
    }

    info!(
        files = available.len(),
        records = records.len(),
        matched,
        newly_bound,
        "matched attachments"
    );

    newly_bound
}
