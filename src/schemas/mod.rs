use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub(crate) mod activity;
pub(crate) mod attendance;
pub(crate) mod course;
pub(crate) mod exam_score;
pub(crate) mod grade;
pub(crate) mod notification;
pub(crate) mod parent;
pub(crate) mod profile;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) api_prefix: String,
}

/// RFC 3339, or a `datetime-local` value (`YYYY-MM-DDTHH:MM[:SS]`) taken as UTC.
fn parse_datetime_flexible(raw: &str) -> Option<PrimitiveDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        let utc = value.to_offset(UtcOffset::UTC);
        return Some(PrimitiveDateTime::new(utc.date(), utc.time()));
    }

    let candidate = match raw.len() {
        16 if raw.as_bytes().get(10) == Some(&b'T') => format!("{raw}:00Z"),
        19 if raw.as_bytes().get(10) == Some(&b'T') => format!("{raw}Z"),
        _ => return None,
    };
    OffsetDateTime::parse(&candidate, &Rfc3339)
        .ok()
        .map(|value| PrimitiveDateTime::new(value.date(), value.time()))
}

pub(crate) fn deserialize_option_datetime_flexible<'de, D>(
    deserializer: D,
) -> Result<Option<PrimitiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => parse_datetime_flexible(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid datetime: {value}")))
            .map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_datetime_flexible;
    use time::macros::datetime;

    #[test]
    fn parses_rfc3339_with_offset_as_utc() {
        assert_eq!(
            parse_datetime_flexible("2025-03-01T10:00:00+02:00"),
            Some(datetime!(2025-03-01 08:00:00))
        );
    }

    #[test]
    fn parses_datetime_local_values() {
        assert_eq!(parse_datetime_flexible("2025-03-01T10:00"), Some(datetime!(2025-03-01 10:00:00)));
        assert_eq!(
            parse_datetime_flexible("2025-03-01T10:00:30"),
            Some(datetime!(2025-03-01 10:00:30))
        );
        assert_eq!(parse_datetime_flexible("tomorrow"), None);
    }
}
