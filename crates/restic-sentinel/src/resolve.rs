use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::catalog::{ListOptions, Snapshot, SnapshotSource};
use crate::error::Result;
use crate::target::HostPath;

/// Resolved catalog state for one run: the latest known snapshot per requested
/// (host, path) key, plus the records themselves keyed by snapshot id.
/// Single-owner, built once, discarded after classification.
#[derive(Debug, Default)]
pub struct SnapshotIndex {
    // Invariant: every id stored here is a key of `by_id`.
    latest_by_target: HashMap<HostPath, String>,
    by_id: HashMap<String, Snapshot>,
}

impl SnapshotIndex {
    /// Query the catalog once per distinct host among `targets` and track the
    /// latest snapshot per requested key. The only-latest hint trims the
    /// listing but is not relied on for correctness; timestamps are compared
    /// here regardless. A failed host query aborts the whole run.
    pub fn resolve_latest(source: &dyn SnapshotSource, targets: &[HostPath]) -> Result<Self> {
        let wanted: HashSet<&HostPath> = targets.iter().collect();
        let hosts: BTreeSet<&str> = targets.iter().map(|t| t.host.as_str()).collect();

        let mut index = Self::default();
        for host in hosts {
            debug!("listing latest snapshots for host {host}");
            let snapshots = source.list_snapshots(&ListOptions::latest_for_host(host))?;
            for snapshot in snapshots {
                index.ingest(snapshot, &wanted);
            }
        }
        Ok(index)
    }

    fn ingest(&mut self, snapshot: Snapshot, wanted: &HashSet<&HostPath>) {
        // One record may cover several paths, so it can become the latest for
        // several keys at once. Queries are host-scoped but not path-scoped;
        // keys nobody asked about are dropped here.
        for path in &snapshot.paths {
            let key = HostPath::new(&snapshot.hostname, path);
            if !wanted.contains(&key) {
                debug!(
                    "ignoring snapshot {} for {key}: not a requested host path",
                    snapshot.short_id
                );
                continue;
            }
            let tracked_time = self
                .latest_by_target
                .get(&key)
                .and_then(|id| self.by_id.get(id))
                .map(|s| s.time);
            match tracked_time {
                // Equal timestamps keep the first-seen record.
                Some(t) if snapshot.time <= t => {}
                _ => {
                    self.latest_by_target.insert(key, snapshot.id.clone());
                }
            }
        }
        self.by_id.insert(snapshot.id.clone(), snapshot);
    }

    /// Latest snapshot for a key, if the catalog had one. Absence is a normal
    /// outcome, not an error.
    pub fn get_latest(&self, key: &HostPath) -> Option<&Snapshot> {
        self.latest_by_target
            .get(key)
            .and_then(|id| self.by_id.get(id))
    }

    pub fn has_snapshot(&self, key: &HostPath) -> bool {
        self.latest_by_target.contains_key(key)
    }
}
