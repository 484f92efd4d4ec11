use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Normalize the catalog's native timestamp (ISO-8601, arbitrary offset) to a
/// timezone-naive UTC instant. All core comparisons happen in this form.
pub fn parse_catalog_time(raw: &str) -> Result<NaiveDateTime> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|e| Error::msg(format!("invalid snapshot timestamp '{raw}': {e}")))?;
    Ok(parsed.with_timezone(&Utc).naive_utc())
}

pub fn naive_utc_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub(crate) fn de_naive_utc<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_catalog_time(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn normalizes_negative_offset_to_utc() {
        let t = parse_catalog_time("2018-04-30T12:30:22.033227319-07:00").expect("parse");
        let want = NaiveDate::from_ymd_opt(2018, 4, 30)
            .expect("date")
            .and_hms_nano_opt(19, 30, 22, 33_227_319)
            .expect("time");
        assert_eq!(t, want);
    }

    #[test]
    fn accepts_zulu_suffix() {
        let t = parse_catalog_time("2020-01-02T03:04:05Z").expect("parse");
        let want = NaiveDate::from_ymd_opt(2020, 1, 2)
            .expect("date")
            .and_hms_opt(3, 4, 5)
            .expect("time");
        assert_eq!(t, want);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_catalog_time("not-a-timestamp").is_err());
    }
}
