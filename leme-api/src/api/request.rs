//! Profile request parsing
//!
//! Bodies are parsed by hand rather than through a typed extractor so that
//! every malformed input maps to a 400 with an `error` message naming the
//! offending field. Legacy field names are accepted as aliases.

use serde_json::{Map, Value};

use super::error::ApiError;
use crate::encoder::Profile;

const AREA: &[&str] = &["area"];
const ACCESSIBILITY: &[&str] = &["accessibility", "acessibilidade"];
const MODULES_COMPLETED: &[&str] = &["modules_completed", "modulos_concluidos"];
const DAYS_ON_PLATFORM: &[&str] = &["days_on_platform", "tempo_plataforma_dias"];

/// Parse a profile request body
pub fn parse_profile(body: &[u8]) -> Result<Profile, ApiError> {
    let not_object = || ApiError::InvalidRequest("Request body must be a JSON object".to_string());

    let value: Value = serde_json::from_slice(body).map_err(|_| not_object())?;
    let object = match value {
        Value::Object(object) if !object.is_empty() => object,
        _ => return Err(not_object()),
    };

    Ok(Profile {
        area: required_string(&object, AREA)?,
        accessibility: required_string(&object, ACCESSIBILITY)?,
        modules_completed: optional_count(&object, MODULES_COMPLETED)?,
        days_on_platform: optional_count(&object, DAYS_ON_PLATFORM)?,
    })
}

/// First present, non-null field among `names`
fn field<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| object.get(*name))
        .find(|value| !value.is_null())
}

fn required_string(object: &Map<String, Value>, names: &[&str]) -> Result<String, ApiError> {
    let name = names[0];
    match field(object, names) {
        None => Err(ApiError::InvalidRequest(format!(
            "Missing required field: {}",
            name
        ))),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ApiError::InvalidRequest(format!(
            "Field {} must be a string",
            name
        ))),
    }
}

fn optional_count(object: &Map<String, Value>, names: &[&str]) -> Result<u32, ApiError> {
    let name = names[0];
    match field(object, names) {
        None => Ok(0),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                ApiError::InvalidRequest(format!("Field {} must be a non-negative integer", name))
            }),
    }
}
