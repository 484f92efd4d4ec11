use chrono::NaiveDateTime;

use crate::resolve::SnapshotIndex;
use crate::target::HostPath;

/// Order-preserving three-way partition of the requested targets.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecencyBuckets {
    pub recent: Vec<HostPath>,
    pub stale: Vec<HostPath>,
    pub missing: Vec<HostPath>,
}

impl RecencyBuckets {
    pub fn all_recent(&self) -> bool {
        self.stale.is_empty() && self.missing.is_empty()
    }
}

/// Bucket every target by the recency of its latest snapshot. Total and pure:
/// each key lands in exactly one bucket, in input order. A timestamp exactly
/// equal to the cutoff counts as stale.
pub fn classify(
    targets: &[HostPath],
    cutoff: NaiveDateTime,
    index: &SnapshotIndex,
) -> RecencyBuckets {
    let mut buckets = RecencyBuckets::default();
    for key in targets {
        match index.get_latest(key) {
            None => buckets.missing.push(key.clone()),
            Some(snapshot) if snapshot.time > cutoff => buckets.recent.push(key.clone()),
            Some(_) => buckets.stale.push(key.clone()),
        }
    }
    buckets
}
