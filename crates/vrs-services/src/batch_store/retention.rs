use chrono::{DateTime, Duration, Utc};
use vrs_core::UploadBatch;

/// Keep only batches strictly newer than `now - window`, preserving order.
///
/// A window reaching past the earliest representable instant keeps everything.
pub fn prune(batches: Vec<UploadBatch>, now: DateTime<Utc>, window: Duration) -> Vec<UploadBatch> {
    let Some(cutoff) = now.checked_sub_signed(window) else {
        return batches;
    };
    batches
        .into_iter()
        .filter(|batch| batch.timestamp > cutoff)
        .collect()
}
