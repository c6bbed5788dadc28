use diary_types::api::EntryRequest;
use diary_types::models::{Entry, EntryPayload, EntryType, NewEntry};

use crate::error::ApiError;
use crate::filter::parse_date;

/// Gate for entry creation: a known `entryType` and that type's required
/// field. Fields belonging to other types are dropped.
pub fn validate_new_entry(req: EntryRequest) -> Result<NewEntry, ApiError> {
    let raw_type = req
        .entry_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingEntryType)?;
    let entry_type: EntryType = raw_type.parse().map_err(|_| ApiError::InvalidEntryType)?;

    let payload = match entry_type {
        EntryType::Food => EntryPayload::Food {
            food_name: required(req.food_name, entry_type)?,
            meal_type: req.meal_type,
            calories: req.calories,
        },
        EntryType::Symptom => EntryPayload::Symptom {
            symptom_type: required(req.symptom_type, entry_type)?,
            severity: req.symptom_severity,
        },
        EntryType::Exercise => EntryPayload::Exercise {
            exercise_type: required(req.exercise_type, entry_type)?,
            intensity: req.exercise_intensity,
            duration: req.exercise_duration,
        },
    };

    let date = req
        .date
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(parse_date)
        .transpose()?;

    Ok(NewEntry {
        date,
        notes: req.notes,
        payload,
    })
}

/// Apply a partial update. Only fields present in `req` change; the
/// required-field rule is not re-checked, but columns that no longer match
/// the (possibly changed) entry type are cleared.
pub fn merge_update(entry: &mut Entry, req: EntryRequest) -> Result<(), ApiError> {
    if let Some(raw) = req.entry_type.as_deref().filter(|t| !t.is_empty()) {
        entry.entry_type = raw.parse().map_err(|_| ApiError::InvalidEntryType)?;
    }
    if let Some(raw) = req.date.as_deref().filter(|d| !d.is_empty()) {
        entry.date = parse_date(raw)?;
    }

    macro_rules! overwrite {
        ($($field:ident),* $(,)?) => {
            $(if let Some(value) = req.$field {
                entry.$field = Some(value);
            })*
        };
    }
    overwrite!(
        meal_type,
        food_name,
        calories,
        symptom_type,
        symptom_severity,
        exercise_type,
        exercise_intensity,
        exercise_duration,
        notes,
    );

    entry.normalize();
    Ok(())
}

fn required(value: Option<String>, entry_type: EntryType) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingRequiredField {
            field: entry_type.required_field(),
            entry_type,
        })
}
