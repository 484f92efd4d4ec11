use std::process::{Command, Output};

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::timeutil;

/// One entry from the restic snapshot catalog. `id` is globally unique;
/// `short_id` is only unique within a single listing. The trailing metadata
/// fields are carried through for display but never inspected by core logic.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub short_id: String,
    #[serde(deserialize_with = "timeutil::de_naive_utc")]
    pub time: NaiveDateTime,
    pub hostname: String,
    pub paths: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub uid: Option<u32>,
    #[serde(default)]
    pub gid: Option<u32>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub tree: Option<String>,
}

/// Filters for a catalog listing. Path and tag filters are conjunctive: a
/// snapshot must cover all requested paths and carry all requested tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Only list the latest snapshot per host and path set.
    pub only_latest: bool,
    pub host: Option<String>,
    pub paths: Vec<String>,
    pub tags: Vec<String>,
}

impl ListOptions {
    pub fn latest_for_host(host: &str) -> Self {
        Self {
            only_latest: true,
            host: Some(host.to_string()),
            ..Self::default()
        }
    }
}

/// Seam to the snapshot catalog. The production implementation shells out to
/// restic; tests script this with in-memory sources.
pub trait SnapshotSource {
    fn list_snapshots(&self, opts: &ListOptions) -> Result<Vec<Snapshot>>;
}

#[derive(Debug, Clone)]
pub struct ResticCli {
    binary: String,
}

impl ResticCli {
    pub fn new<B: Into<String>>(binary: B) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for ResticCli {
    fn default() -> Self {
        Self::new("restic")
    }
}

impl SnapshotSource for ResticCli {
    // Repository location and password come from restic's own environment
    // variables (RESTIC_REPOSITORY, RESTIC_PASSWORD, ...).
    fn list_snapshots(&self, opts: &ListOptions) -> Result<Vec<Snapshot>> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("snapshots").arg("--json");
        if opts.only_latest {
            cmd.arg("--last");
        }
        if let Some(host) = &opts.host {
            cmd.arg("--host").arg(host);
        }
        for path in &opts.paths {
            cmd.arg("--path").arg(path);
        }
        for tag in &opts.tags {
            cmd.arg("--tag").arg(tag);
        }

        let out = run_command_output(&mut cmd)?;
        if !out.status.success() {
            return Err(Error::msg(format!(
                "restic snapshots failed: {}",
                command_summary(&out)
            )));
        }
        decode_snapshots(&String::from_utf8_lossy(&out.stdout))
    }
}

/// Decode a `restic snapshots --json` document. restic prints nothing (or a
/// literal `null`) when no snapshot matches, so both decode to an empty list.
pub fn decode_snapshots(raw: &str) -> Result<Vec<Snapshot>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        info!("did not parse any entries from the snapshot listing");
        return Ok(Vec::new());
    }
    let snapshots: Vec<Snapshot> = serde_json::from_str(raw)
        .map_err(|e| Error::msg(format!("undecodable snapshot listing: {e}")))?;
    debug!("parsed {} snapshot entries", snapshots.len());
    Ok(snapshots)
}

fn run_command_output(cmd: &mut Command) -> Result<Output> {
    cmd.output()
        .map_err(|e| Error::msg(format!("failed to run command {:?}: {e}", cmd)))
}

fn command_summary(out: &Output) -> String {
    let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    if !stdout.is_empty() {
        return stdout;
    }
    format!("status {}", out.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const KOTORI_LISTING: &str = r#"[
        {
            "time": "2018-04-30T12:30:22.033227319-07:00",
            "parent": "876d720dc0904ce5be20349e8f88040ebbc1d815f4354e0fbd19cc40e8631066",
            "tree": "75a841636e8c4a8fb735d0baf58a5687fb759fb144b54c678156ad714f486dee",
            "paths": [
                "/home/kedo/Music"
            ],
            "hostname": "kotori",
            "username": "kedo",
            "uid": 1000,
            "gid": 1000,
            "id": "929e9b26c7664bea95187fc3a3a2adf65d834de459e941f88049de9176c72f89",
            "short_id": "929e9b26"
        },
        {
            "time": "2018-05-05T18:06:07.241594457-07:00",
            "tree": "3c8bdfe5f731400c8f5571c4bb75c9aa5517363c204241a5bb1eee2591edbb5d",
            "paths": [
                "/home/kedo/Documents",
                "/home/kedo/Music",
                "/home/kedo/Pictures"
            ],
            "hostname": "kotori",
            "username": "kedo",
            "id": "9840af0abfa94abe9982707a232ed29e045d94ee5e434436943aba33221500c1",
            "short_id": "9840af0a"
        }
    ]"#;

    #[test]
    fn decodes_a_real_listing() {
        let snapshots = decode_snapshots(KOTORI_LISTING).expect("decode");
        assert_eq!(snapshots.len(), 2);

        let first = &snapshots[0];
        assert_eq!(
            first.id,
            "929e9b26c7664bea95187fc3a3a2adf65d834de459e941f88049de9176c72f89"
        );
        assert_eq!(first.short_id, "929e9b26");
        assert_eq!(first.hostname, "kotori");
        assert_eq!(first.paths, vec!["/home/kedo/Music"]);
        assert_eq!(first.username.as_deref(), Some("kedo"));
        assert_eq!(first.uid, Some(1000));
        assert_eq!(first.gid, Some(1000));
        assert!(first.parent.is_some());
        assert_eq!(
            first.time,
            NaiveDate::from_ymd_opt(2018, 4, 30)
                .expect("date")
                .and_hms_nano_opt(19, 30, 22, 33_227_319)
                .expect("time")
        );

        // Optional metadata may be absent entirely.
        let second = &snapshots[1];
        assert_eq!(second.short_id, "9840af0a");
        assert_eq!(second.paths.len(), 3);
        assert_eq!(second.uid, None);
        assert_eq!(second.gid, None);
        assert_eq!(second.parent, None);
    }

    #[test]
    fn empty_and_null_listings_decode_to_nothing() {
        assert!(decode_snapshots("").expect("empty").is_empty());
        assert!(decode_snapshots("  \n").expect("blank").is_empty());
        assert!(decode_snapshots("null").expect("null").is_empty());
    }

    #[test]
    fn malformed_listing_is_an_error() {
        assert!(decode_snapshots("{not json").is_err());
        assert!(decode_snapshots(r#"[{"id": "x"}]"#).is_err());
    }
}
