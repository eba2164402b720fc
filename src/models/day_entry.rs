//! Modelo de patrones de días
//!
//! Representa la recurrencia semanal como un conjunto de entradas (día ISO, paridad).
//! Las columnas JSON heredadas pueden contener un simple arreglo de números de día;
//! `normalize_days` es el único punto donde se interpreta la forma cruda persistida.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paridad de la semana ISO en la que aplica una entrada
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    All,
    Even,
    Odd,
}

impl Parity {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "all" => Some(Parity::All),
            "even" => Some(Parity::Even),
            "odd" => Some(Parity::Odd),
            _ => None,
        }
    }

    /// Verifica si la paridad se cumple para un número de semana ISO
    pub fn matches_week(self, iso_week: u32) -> bool {
        match self {
            Parity::All => true,
            Parity::Even => iso_week % 2 == 0,
            Parity::Odd => iso_week % 2 == 1,
        }
    }
}

/// Entrada de recurrencia: día ISO (1 = lunes ... 7 = domingo) y paridad
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayEntry {
    pub day: u8,
    pub parity: Parity,
}

impl DayEntry {
    pub fn new(day: u8, parity: Parity) -> Self {
        Self { day, parity }
    }

    pub fn every(day: u8) -> Self {
        Self::new(day, Parity::All)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().and_then(valid_day).map(DayEntry::every),
            Value::Object(map) => {
                let day = map.get("day").and_then(Value::as_u64).and_then(valid_day)?;
                let parity = match map.get("parity") {
                    None | Some(Value::Null) => Parity::All,
                    Some(Value::String(s)) => Parity::parse(s)?,
                    Some(_) => return None,
                };
                Some(DayEntry::new(day, parity))
            }
            _ => None,
        }
    }
}

fn valid_day(day: u64) -> Option<u8> {
    (1..=7).contains(&day).then_some(day as u8)
}

/// Normaliza un valor JSON crudo (`null`, `number[]` heredado o `DayEntry[]`).
///
/// Nunca falla: cualquier forma no reconocida degrada a una lista vacía.
pub fn normalize_days(raw: &Value) -> Vec<DayEntry> {
    let Value::Array(items) = raw else {
        return Vec::new();
    };

    items
        .iter()
        .map(DayEntry::from_value)
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

/// Igual que `normalize_days` pero para columnas opcionales
pub fn normalize_optional_days(raw: Option<&Value>) -> Vec<DayEntry> {
    raw.map(normalize_days).unwrap_or_default()
}

/// Copia ordenada por (día, paridad)
pub fn sorted_days(days: &[DayEntry]) -> Vec<DayEntry> {
    let mut sorted = days.to_vec();
    sorted.sort();
    sorted
}

/// Dos conjuntos son iguales si, una vez ordenados, coinciden elemento a elemento.
/// Los duplicados no se eliminan: se espera que el llamador los pase ya depurados.
pub fn are_day_entries_equal(a: &[DayEntry], b: &[DayEntry]) -> bool {
    a.len() == b.len() && sorted_days(a) == sorted_days(b)
}

/// Verdadero si alguna entrada coincide con el día ISO de `date` y su paridad se cumple
pub fn is_any_day_active_for_date(days: &[DayEntry], date: NaiveDate) -> bool {
    let weekday = date.weekday().number_from_monday() as u8;
    let iso_week = date.iso_week().week();

    days.iter()
        .any(|entry| entry.day == weekday && entry.parity.matches_week(iso_week))
}

const DAY_LABELS: [&str; 7] = ["L", "M", "Me", "J", "V", "S", "D"];

/// Etiqueta compacta ("L M Me") usada para nombrar los trajets generados.
/// Se ordena antes de formatear para que el nombre sea determinista.
pub fn format_days_short(days: &[DayEntry]) -> String {
    let mut sorted = sorted_days(days);
    sorted.dedup();

    sorted
        .iter()
        .map(|entry| {
            let label = DAY_LABELS[(entry.day - 1) as usize];
            match entry.parity {
                Parity::All => label.to_string(),
                Parity::Even => format!("{}(p)", label),
                Parity::Odd => format!("{}(i)", label),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serializa un patrón para persistirlo en una columna JSONB
pub fn days_to_value(days: &[DayEntry]) -> Value {
    serde_json::to_value(days).unwrap_or(Value::Array(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_normalize_legacy_numbers() {
        let days = normalize_days(&json!([1, 3, 5]));
        assert_eq!(days, vec![DayEntry::every(1), DayEntry::every(3), DayEntry::every(5)]);
    }

    #[test]
    fn test_normalize_rich_entries() {
        let days = normalize_days(&json!([{ "day": 2, "parity": "even" }, { "day": 4 }]));
        assert_eq!(days, vec![DayEntry::new(2, Parity::Even), DayEntry::every(4)]);
    }

    #[test]
    fn test_normalize_degrades_to_empty() {
        assert!(normalize_days(&Value::Null).is_empty());
        assert!(normalize_days(&json!([])).is_empty());
        assert!(normalize_days(&json!({ "day": 1 })).is_empty());
        assert!(normalize_days(&json!(["lundi"])).is_empty());
        assert!(normalize_days(&json!([0, 8])).is_empty());
        assert!(normalize_days(&json!([{ "day": 1, "parity": "weekly" }])).is_empty());
    }

    #[test]
    fn test_equality_is_normalization_invariant() {
        let legacy = normalize_days(&json!([1, 3, 5]));
        let rich = normalize_days(&json!([
            { "day": 1, "parity": "all" },
            { "day": 3, "parity": "all" },
            { "day": 5, "parity": "all" }
        ]));
        assert!(are_day_entries_equal(&legacy, &rich));
    }

    #[test]
    fn test_equality_ignores_order_but_not_parity() {
        let a = vec![DayEntry::every(5), DayEntry::new(1, Parity::Odd)];
        let b = vec![DayEntry::new(1, Parity::Odd), DayEntry::every(5)];
        let c = vec![DayEntry::new(1, Parity::Even), DayEntry::every(5)];
        assert!(are_day_entries_equal(&a, &b));
        assert!(!are_day_entries_equal(&a, &c));
        assert!(!are_day_entries_equal(&a, &a[..1]));
    }

    #[test]
    fn test_active_for_date_with_parity() {
        // 2024-01-01 es lunes de la semana ISO 1 (impar), 2024-01-08 semana 2 (par)
        let odd_mondays = vec![DayEntry::new(1, Parity::Odd)];
        assert!(is_any_day_active_for_date(&odd_mondays, date("2024-01-01")));
        assert!(!is_any_day_active_for_date(&odd_mondays, date("2024-01-08")));
        assert!(!is_any_day_active_for_date(&odd_mondays, date("2024-01-02")));

        let even_mondays = vec![DayEntry::new(1, Parity::Even)];
        assert!(is_any_day_active_for_date(&even_mondays, date("2024-01-08")));

        let sundays = vec![DayEntry::every(7)];
        assert!(is_any_day_active_for_date(&sundays, date("2024-01-07")));
    }

    #[test]
    fn test_format_days_short_is_sorted() {
        let days = vec![DayEntry::every(3), DayEntry::every(1), DayEntry::every(2)];
        assert_eq!(format_days_short(&days), "L M Me");

        let alternating = vec![DayEntry::new(5, Parity::Even), DayEntry::every(1)];
        assert_eq!(format_days_short(&alternating), "L V(p)");
    }
}
