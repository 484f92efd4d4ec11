use chrono::{Duration, NaiveDateTime};

use crate::catalog::SnapshotSource;
use crate::error::{Error, Result};
use crate::recency::{self, RecencyBuckets};
use crate::resolve::SnapshotIndex;
use crate::target::HostPath;

/// Result of one recency check: the resolved catalog state, the buckets, and
/// the instant they were judged against.
#[derive(Debug)]
pub struct CheckOutcome {
    now: NaiveDateTime,
    index: SnapshotIndex,
    buckets: RecencyBuckets,
}

/// Resolve the latest snapshot per target and bucket every target against
/// `now - max_age_hours`. Validation of the target list happens before any
/// catalog query; a query failure aborts with no partial outcome.
pub fn run_check(
    source: &dyn SnapshotSource,
    targets: &[HostPath],
    max_age_hours: i64,
    now: NaiveDateTime,
) -> Result<CheckOutcome> {
    if targets.is_empty() {
        return Err(Error::msg("at least one host:/path target is required"));
    }
    let index = SnapshotIndex::resolve_latest(source, targets)?;
    // The oldest a snapshot can be while still counting as recent enough.
    let cutoff = now - Duration::hours(max_age_hours);
    let buckets = recency::classify(targets, cutoff, &index);
    Ok(CheckOutcome {
        now,
        index,
        buckets,
    })
}

impl CheckOutcome {
    pub fn buckets(&self) -> &RecencyBuckets {
        &self.buckets
    }

    pub fn index(&self) -> &SnapshotIndex {
        &self.index
    }

    /// 0 only when every requested target has a recent snapshot.
    pub fn exit_code(&self) -> i32 {
        if self.buckets.all_recent() { 0 } else { 1 }
    }

    pub fn render_report(&self) -> String {
        let mut groups = vec![
            "Here are the results of checking for the recency of snapshots for the specified host paths."
                .to_string(),
        ];

        if !self.buckets.recent.is_empty() {
            let mut lines = vec!["Host paths with recent snapshots:".to_string()];
            lines.extend(self.buckets.recent.iter().map(|k| self.describe(k)));
            groups.push(lines.join("\n"));
        }
        if !self.buckets.stale.is_empty() {
            let mut lines = vec!["Host paths with old snapshots:".to_string()];
            lines.extend(self.buckets.stale.iter().map(|k| self.describe(k)));
            groups.push(lines.join("\n"));
        }
        if !self.buckets.missing.is_empty() {
            let mut lines = vec!["Host paths with no snapshots:".to_string()];
            lines.extend(self.buckets.missing.iter().map(|k| k.to_string()));
            groups.push(lines.join("\n"));
        }

        groups.join("\n\n")
    }

    fn describe(&self, key: &HostPath) -> String {
        match self.index.get_latest(key) {
            Some(snapshot) => {
                let hours = (self.now - snapshot.time).num_seconds() as f64 / 3600.0;
                format!(
                    "{key} snapshot {} is {hours:.2} hours old",
                    snapshot.short_id
                )
            }
            // Missing keys are rendered bare; describe is only called for
            // bucketed keys with a known snapshot.
            None => key.to_string(),
        }
    }
}
