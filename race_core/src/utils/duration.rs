// parsing and serde codec for "HH:MM:SS" durations

use chrono::Duration;
use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

/// Parse a `HH:MM:SS` string into a `chrono::Duration`.
/// Hours may exceed 23; minutes and seconds must be below 60.
pub fn parse_hms(s: &str) -> Result<Duration, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("expected HH:MM:SS, got '{s}'"));
    }
    let hours: i64 = parts[0]
        .parse()
        .map_err(|_| format!("invalid hours in '{s}'"))?;
    let minutes: i64 = parts[1]
        .parse()
        .map_err(|_| format!("invalid minutes in '{s}'"))?;
    let seconds: i64 = parts[2]
        .parse()
        .map_err(|_| format!("invalid seconds in '{s}'"))?;
    if minutes >= 60 || seconds >= 60 {
        return Err(format!("minutes and seconds must be below 60 in '{s}'"));
    }
    Ok(Duration::seconds(hours * 3600 + minutes * 60 + seconds))
}

/// Format a duration as `HH:MM:SS`, truncating sub-second precision.
pub fn format_hms(d: &Duration) -> String {
    let total = d.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// serde codec for duration fields carried as `HH:MM:SS` strings,
/// usable via `#[serde(with = "crate::utils::duration")]`.
pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_hms(d))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_hms(&s).map_err(D::Error::custom)
}

/// Same codec for `Option<Duration>` fields,
/// usable via `#[serde(with = "crate::utils::duration::option")]`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        d: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => serializer.serialize_some(&format_hms(d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| parse_hms(&s).map_err(D::Error::custom)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_interval_and_round_gaps() {
        assert_eq!(parse_hms("00:00:30").unwrap(), Duration::seconds(30));
        assert_eq!(parse_hms("00:10:00").unwrap(), Duration::minutes(10));
        assert_eq!(parse_hms("01:30:00").unwrap(), Duration::minutes(90));
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(parse_hms("30").is_err());
        assert!(parse_hms("00:61:00").is_err());
        assert!(parse_hms("aa:00:00").is_err());
    }

    #[test]
    fn formats_back_to_hms() {
        assert_eq!(format_hms(&Duration::seconds(5400)), "01:30:00");
        assert_eq!(format_hms(&Duration::seconds(30)), "00:00:30");
    }
}
