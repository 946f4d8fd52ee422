//! Custom serde helpers for backend wire formats.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 with an offset, or a naive ISO 8601 timestamp (with `T`
/// or a space as separator), which is read as UTC. The backend stores naive
/// UTC timestamps, so both shapes show up on the wire.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
}

/// Format a timestamp as RFC 3339 in UTC (`...Z`).
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// `DateTime<Utc>` as an ISO 8601 string, lenient on input.
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .map_err(|e| serde::de::Error::custom(format!("Invalid timestamp {:?}: {}", raw, e)))
    }
}

/// Optional variant of [`timestamp`]. Pair with
/// `#[serde(default, skip_serializing_if = "Option::is_none")]`.
pub mod timestamp_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => super::timestamp::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|raw| {
            super::parse_timestamp(&raw).map_err(|e| {
                serde::de::Error::custom(format!("Invalid timestamp {:?}: {}", raw, e))
            })
        })
        .transpose()
    }
}
