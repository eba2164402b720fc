//! Horarios HH:MM
//!
//! Conversión entre `NaiveTime`, texto "HH:MM" y segundos del día.
//! El sistema no sigue el cambio de fecha: toda la aritmética es módulo 24h.

use chrono::{NaiveTime, Timelike};
use lazy_static::lazy_static;
use regex::Regex;

pub const SECONDS_PER_DAY: i64 = 86_400;

lazy_static! {
    static ref HHMM_REGEX: Regex = Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)(?::([0-5]\d))?$").unwrap();
}

/// Parsear "H:MM", "HH:MM" o "HH:MM:SS"
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let caps = HHMM_REGEX.captures(value.trim())?;
    let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: u32 = caps
        .get(3)
        .map(|s| s.as_str().parse().unwrap_or(0))
        .unwrap_or(0);
    NaiveTime::from_hms_opt(hours, minutes, seconds)
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn to_seconds(time: NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64
}

/// Convierte segundos (posiblemente negativos o > 24h) a una hora del día
pub fn from_seconds(seconds: i64) -> NaiveTime {
    let normalized = seconds.rem_euclid(SECONDS_PER_DAY) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(normalized, 0).unwrap_or(NaiveTime::MIN)
}

/// Serde para `Option<NaiveTime>` en formato "HH:MM"
pub mod hhmm_option {
    use super::{format_hhmm, parse_hhmm};
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&format_hhmm(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_hhmm(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("horario inválido '{}', se espera HH:MM", s))),
        }
    }
}
