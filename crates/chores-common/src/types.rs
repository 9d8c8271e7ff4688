use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

pub type ChildId = i64;
pub type ChoreId = i64;

/// Recurrence category for a chore.
///
/// The server stores the frequency as free text; anything absent or empty is
/// treated as [`Frequency::Daily`] everywhere the client groups or displays chores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Oneoff,
}

impl Frequency {
    /// Display order used by the server when listing chores.
    pub const ALL: [Frequency; 4] =
        [Frequency::Daily, Frequency::Weekly, Frequency::Monthly, Frequency::Oneoff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Oneoff => "oneoff",
        }
    }

    /// Capitalized label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Oneoff => "One-off",
        }
    }

    /// Decode a frequency as it appears on the wire, defaulting absent or
    /// empty values to daily.
    pub fn from_wire(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Frequency::Daily),
            Some(value) => value.parse(),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "oneoff" | "one-off" => Ok(Frequency::Oneoff),
            _ => Err(Error::InvalidFrequency(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Frequency::from_wire(Some(&raw)).map_err(serde::de::Error::custom)
    }
}

/// Field deserializer accepting `null` as well as missing and empty values.
pub fn frequency_or_default<'de, D>(deserializer: D) -> std::result::Result<Frequency, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Frequency::from_wire(raw.as_deref()).map_err(serde::de::Error::custom)
}

/// A child as returned by the server. Identity is owned by the server; the
/// client only ever holds a copy from the latest fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Child {
    pub fn new(id: ChildId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), display_order: None, created_at: None }
    }
}

/// A chore with its completion state for the current period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chore {
    pub id: ChoreId,
    /// Only present on freshly created chores; list responses are already scoped to a child.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<ChildId>,
    pub title: String,
    #[serde(default, deserialize_with = "frequency_or_default")]
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// One completed chore inside a history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryChore {
    pub chore_id: ChoreId,
    pub title: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryChild {
    pub id: ChildId,
    pub name: String,
    #[serde(default)]
    pub chores: Vec<HistoryChore>,
}

/// Report row: everything completed on one day, grouped by child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDay {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    #[serde(default)]
    pub children: Vec<HistoryChild>,
}

/// Per-child report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildHistoryDay {
    pub date: String,
    #[serde(default)]
    pub chores: Vec<HistoryChore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_defaults_to_daily() {
        assert_eq!(Frequency::from_wire(None).unwrap(), Frequency::Daily);
        assert_eq!(Frequency::from_wire(Some("")).unwrap(), Frequency::Daily);
        assert_eq!(Frequency::from_wire(Some("  ")).unwrap(), Frequency::Daily);
        assert_eq!(Frequency::from_wire(Some("weekly")).unwrap(), Frequency::Weekly);
        assert!(Frequency::from_wire(Some("hourly")).is_err());
    }

    #[test]
    fn test_frequency_parse_accepts_label_spelling() {
        assert_eq!("One-off".parse::<Frequency>().unwrap(), Frequency::Oneoff);
        assert_eq!("MONTHLY".parse::<Frequency>().unwrap(), Frequency::Monthly);
    }

    #[test]
    fn test_chore_deserialization_with_missing_fields() {
        let json = r#"[
            {"id": 1, "title": "Feed cat", "frequency": "weekly", "completed": true, "completed_at": "2024-03-04 08:15:00"},
            {"id": 2, "title": "Make bed", "frequency": null, "completed": false, "completed_at": null},
            {"id": 3, "title": "Brush teeth", "frequency": ""},
            {"id": 4, "child_id": 7, "title": "Dishes", "display_order": 2, "is_active": 1}
        ]"#;

        let chores: Vec<Chore> = serde_json::from_str(json).unwrap();
        assert_eq!(chores[0].frequency, Frequency::Weekly);
        assert!(chores[0].completed);
        assert_eq!(chores[1].frequency, Frequency::Daily);
        assert_eq!(chores[2].frequency, Frequency::Daily);
        assert!(!chores[2].completed);
        assert_eq!(chores[3].child_id, Some(7));
        assert_eq!(chores[3].frequency, Frequency::Daily);
    }

    #[test]
    fn test_chore_rejects_unknown_frequency() {
        let json = r#"{"id": 1, "title": "Feed cat", "frequency": "hourly"}"#;
        assert!(serde_json::from_str::<Chore>(json).is_err());
    }

    #[test]
    fn test_frequency_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Frequency::Oneoff).unwrap(), "\"oneoff\"");
    }
}
