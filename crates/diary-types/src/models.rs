use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type EntryId = i64;

/// The three kinds of diary record. Serialized lowercase on the wire and in SQLite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Food,
    Symptom,
    Exercise,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entry type '{0}'")]
pub struct UnknownEntryType(pub String);

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Symptom => "symptom",
            Self::Exercise => "exercise",
        }
    }

    /// Name of the field every entry of this type must carry.
    pub fn required_field(self) -> &'static str {
        match self {
            Self::Food => "foodName",
            Self::Symptom => "symptomType",
            Self::Exercise => "exerciseType",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = UnknownEntryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food" => Ok(Self::Food),
            "symptom" => Ok(Self::Symptom),
            "exercise" => Ok(Self::Exercise),
            other => Err(UnknownEntryType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A diary entry as returned by the API.
///
/// Columns belonging to a different entry type are always `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub user_id: UserId,
    pub date: DateTime<Utc>,
    pub entry_type: EntryType,

    pub meal_type: Option<String>,
    pub food_name: Option<String>,
    pub calories: Option<i64>,

    pub symptom_type: Option<String>,
    pub symptom_severity: Option<i64>,

    pub exercise_type: Option<String>,
    pub exercise_intensity: Option<i64>,
    pub exercise_duration: Option<i64>,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Clear every column that does not belong to `entry_type`.
    pub fn normalize(&mut self) {
        if self.entry_type != EntryType::Food {
            self.meal_type = None;
            self.food_name = None;
            self.calories = None;
        }
        if self.entry_type != EntryType::Symptom {
            self.symptom_type = None;
            self.symptom_severity = None;
        }
        if self.entry_type != EntryType::Exercise {
            self.exercise_type = None;
            self.exercise_intensity = None;
            self.exercise_duration = None;
        }
    }
}

/// Type-specific part of a new entry. Each variant carries exactly the
/// columns that belong to it; the required one is not optional.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryPayload {
    Food {
        meal_type: Option<String>,
        food_name: String,
        calories: Option<i64>,
    },
    Symptom {
        symptom_type: String,
        severity: Option<i64>,
    },
    Exercise {
        exercise_type: String,
        intensity: Option<i64>,
        duration: Option<i64>,
    },
}

impl EntryPayload {
    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::Food { .. } => EntryType::Food,
            Self::Symptom { .. } => EntryType::Symptom,
            Self::Exercise { .. } => EntryType::Exercise,
        }
    }
}

/// A validated entry ready to be stored. `date` falls back to the insert time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub payload: EntryPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_parses_lowercase_only() {
        assert_eq!("food".parse::<EntryType>().unwrap(), EntryType::Food);
        assert_eq!("exercise".parse::<EntryType>().unwrap(), EntryType::Exercise);
        assert!("Food".parse::<EntryType>().is_err());
        assert!("MOOD".parse::<EntryType>().is_err());
    }

    #[test]
    fn normalize_clears_other_variants() {
        let now = Utc::now();
        let mut entry = Entry {
            id: 1,
            user_id: 1,
            date: now,
            entry_type: EntryType::Symptom,
            meal_type: Some("lunch".into()),
            food_name: Some("soup".into()),
            calories: Some(300),
            symptom_type: Some("headache".into()),
            symptom_severity: Some(3),
            exercise_type: Some("run".into()),
            exercise_intensity: Some(2),
            exercise_duration: Some(30),
            notes: Some("after lunch".into()),
            created_at: now,
        };

        entry.normalize();

        assert_eq!(entry.food_name, None);
        assert_eq!(entry.calories, None);
        assert_eq!(entry.exercise_type, None);
        assert_eq!(entry.exercise_duration, None);
        assert_eq!(entry.symptom_type.as_deref(), Some("headache"));
        assert_eq!(entry.symptom_severity, Some(3));
        assert_eq!(entry.notes.as_deref(), Some("after lunch"));
    }

    #[test]
    fn entry_serializes_camel_case_with_nulls() {
        let now = Utc::now();
        let entry = Entry {
            id: 7,
            user_id: 2,
            date: now,
            entry_type: EntryType::Food,
            meal_type: None,
            food_name: Some("toast".into()),
            calories: Some(120),
            symptom_type: None,
            symptom_severity: None,
            exercise_type: None,
            exercise_intensity: None,
            exercise_duration: None,
            notes: None,
            created_at: now,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["entryType"], "food");
        assert_eq!(json["foodName"], "toast");
        assert_eq!(json["userId"], 2);
        assert!(json["symptomType"].is_null());
    }
}
