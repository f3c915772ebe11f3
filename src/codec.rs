//! JSON encoding of the task collection.
//!
//! Timestamps are written as `YYYY-MM-DDTHH:MM:SS.sssZ`: fixed width,
//! millisecond precision, UTC. Text order matches chronological order.
//! Reading is looser: a bare date is midnight UTC and a date-time without
//! an offset is local time.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use eyre::{Context, Result};

use crate::types::Task;

/// Offset-less date-time layouts accepted on read.
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Truncate a timestamp to the precision the text format keeps.
pub fn normalize(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

/// Format a timestamp in the canonical text form.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339, `YYYY-MM-DD` (midnight UTC) and offset-less
/// date-times (local time).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| eyre::eyre!("Timestamp does not exist in the local time zone: {}", s));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid timestamp: {}", s))?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| eyre::eyre!("Invalid timestamp: {}", s))
}

/// Encode a whole collection as one JSON array.
pub fn encode_tasks(tasks: &[Task]) -> Result<String> {
    serde_json::to_string(tasks).context("Failed to serialize tasks")
}

/// Decode a JSON array produced by [`encode_tasks`].
pub fn decode_tasks(raw: &str) -> Result<Vec<Task>> {
    serde_json::from_str(raw).context("Failed to parse stored tasks")
}

pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s).map_err(|e| D::Error::custom(e.to_string()))
    }
}

/// Optional timestamps: missing, `null` and `""` all read as `None`.
pub(crate) mod optional_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&super::format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.is_empty() => super::parse_timestamp(&s)
                .map(Some)
                .map_err(|e| D::Error::custom(e.to_string())),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn task(id: &str, due_date: Option<DateTime<Utc>>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            completed: id.ends_with('2'),
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap() + Duration::milliseconds(250),
            due_date,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_roundtrip_preserves_due_date_presence() {
        let due = Utc.with_ymd_and_hms(2026, 2, 1, 17, 0, 0).unwrap();
        let tasks = vec![task("t-1", Some(due)), task("t-2", None)];

        let decoded = decode_tasks(&encode_tasks(&tasks).unwrap()).unwrap();
        assert_eq!(decoded, tasks);
        assert_eq!(decoded[0].due_date, Some(due));
        assert_eq!(decoded[1].due_date, None);
    }

    #[test]
    fn test_encoded_layout() {
        let due = Utc.with_ymd_and_hms(2026, 2, 1, 17, 0, 0).unwrap();
        let json = encode_tasks(&[task("t-1", Some(due)), task("t-2", None)]).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"[{"id":"t-1","title":"Task t-1","completed":false,"#,
                r#""createdAt":"2026-01-15T08:30:00.250Z","dueDate":"2026-02-01T17:00:00.000Z"},"#,
                r#"{"id":"t-2","title":"Task t-2","completed":true,"createdAt":"2026-01-15T08:30:00.250Z"}]"#
            )
        );
    }

    #[test]
    fn test_timestamp_text_sorts_chronologically() {
        let a = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let b = a + Duration::milliseconds(5);
        let c = a + Duration::days(400);
        let (fa, fb, fc) = (format_timestamp(&a), format_timestamp(&b), format_timestamp(&c));
        assert_eq!(fa.len(), fb.len());
        assert!(fa < fb && fb < fc);
    }

    #[test]
    fn test_decode_accepts_offsets_and_empty_due_date() {
        let raw = r#"[
            {"id":"a","title":"A","completed":false,"createdAt":"2026-01-01T09:00:00+09:00","dueDate":""},
            {"id":"b","title":"B","completed":true,"createdAt":"2026-01-01T00:00:00Z","dueDate":null}
        ]"#;
        let tasks = decode_tasks(raw).unwrap();
        assert_eq!(tasks[0].created_at, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(tasks[0].due_date, None);
        assert_eq!(tasks[1].due_date, None);
    }

    #[test]
    fn test_decode_accepts_dates_without_offset() {
        let raw = r#"[
            {"id":"a","title":"A","completed":false,"createdAt":"2026-01-01","dueDate":"2026-02-03T04:05:06"},
            {"id":"b","title":"B","completed":false,"createdAt":"2026-01-01T10:30"}
        ]"#;
        let tasks = decode_tasks(raw).unwrap();

        assert_eq!(tasks[0].created_at, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let local_due = Local.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).earliest().unwrap();
        assert_eq!(tasks[0].due_date, Some(local_due.with_timezone(&Utc)));
        let local_created = Local.with_ymd_and_hms(2026, 1, 1, 10, 30, 0).earliest().unwrap();
        assert_eq!(tasks[1].created_at, local_created.with_timezone(&Utc));

        // Re-encoded in the canonical form
        let json = encode_tasks(&tasks).unwrap();
        assert!(json.contains(r#""createdAt":"2026-01-01T00:00:00.000Z""#));
    }

    #[test]
    fn test_parse_timestamp_fractional_without_offset() {
        let parsed = parse_timestamp("2026-01-01T00:00:00.250").unwrap();
        let expected = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).earliest().unwrap() + Duration::milliseconds(250);
        assert_eq!(parsed, expected.with_timezone(&Utc));
        assert!(parse_timestamp("2026-02-30").is_err());
        assert!(parse_timestamp("01/02/2026").is_err());
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let raw = r#"[{"id":"a","title":"A","completed":false,"createdAt":"2026-01-01T00:00:00.000Z","priority":3,"tags":["x"]}]"#;
        let tasks = decode_tasks(raw).unwrap();
        assert_eq!(tasks[0].extra.get("priority"), Some(&serde_json::json!(3)));

        let json = encode_tasks(&tasks).unwrap();
        assert!(json.contains(r#""priority":3"#));
        assert!(json.contains(r#""tags":["x"]"#));
        assert_eq!(decode_tasks(&json).unwrap(), tasks);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode_tasks("not json").is_err());
        assert!(decode_tasks(r#"{"id":"a"}"#).is_err());
        assert!(decode_tasks(r#"[{"id":"a","title":"A","completed":false,"createdAt":"yesterday"}]"#).is_err());
    }

    #[test]
    fn test_normalize_truncates_to_millis() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::nanoseconds(1_234_567);
        let normalized = normalize(ts);
        assert_eq!(normalized.timestamp_subsec_nanos(), 1_000_000);
        assert_eq!(parse_timestamp(&format_timestamp(&normalized)).unwrap(), normalized);
    }
}
