use anyhow::{anyhow, bail, Result};
use dinner_core::Constants;
use std::collections::HashMap;

const VALID_KEYS: &[&str] = &[
    "cooldown_days",
    "spin_duration_ms",
    "spin_extra_rotations",
    "spin_completion_delay_ms",
    "storage_key",
];

pub fn apply_overrides(
    constants: &mut Constants,
    overrides: &HashMap<String, serde_json::Value>,
) -> Result<()> {
    for (key, value) in overrides {
        match key.as_str() {
            "cooldown_days" => constants.cooldown_days = as_u32(key, value)?,
            "spin_duration_ms" => constants.spin_duration_ms = as_u64(key, value)?,
            "spin_extra_rotations" => constants.spin_extra_rotations = as_u32(key, value)?,
            "spin_completion_delay_ms" => {
                constants.spin_completion_delay_ms = as_u64(key, value)?;
            }
            "storage_key" => constants.storage_key = as_string(key, value)?,
            _ => bail!(
                "unknown override key '{key}'. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
    }
    crate::check_constants(constants)
}

/// Splits a `key=value` argument. The value is read as JSON when it parses,
/// otherwise as a bare string, so `storage_key=kitchen` needs no quoting.
pub fn parse_override(arg: &str) -> Result<(String, serde_json::Value)> {
    let Some((key, raw)) = arg.split_once('=') else {
        bail!("override '{arg}' must look like key=value");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("override '{arg}' has an empty key");
    }
    let value = serde_json::from_str(raw.trim())
        .unwrap_or_else(|_| serde_json::Value::String(raw.trim().to_string()));
    Ok((key.to_string(), value))
}

fn as_u64(key: &str, value: &serde_json::Value) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| anyhow!("override '{key}': expected a positive integer, got {value}"))
}

fn as_u32(key: &str, value: &serde_json::Value) -> Result<u32> {
    let val = as_u64(key, value)?;
    u32::try_from(val).map_err(|_| anyhow!("override '{key}': value {val} exceeds u32 range"))
}

fn as_string(key: &str, value: &serde_json::Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("override '{key}': expected a string, got {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_integer_override() {
        let mut constants = Constants::default();
        let overrides = HashMap::from([("cooldown_days".to_string(), serde_json::json!(7))]);
        apply_overrides(&mut constants, &overrides).unwrap();
        assert_eq!(constants.cooldown_days, 7);
    }

    #[test]
    fn test_apply_string_override() {
        let mut constants = Constants::default();
        let (key, value) = parse_override("storage_key=kitchen").unwrap();
        apply_overrides(&mut constants, &HashMap::from([(key, value)])).unwrap();
        assert_eq!(constants.storage_key, "kitchen");
    }

    #[test]
    fn test_unknown_key_errors() {
        let mut constants = Constants::default();
        let overrides = HashMap::from([("nonexistent_field".to_string(), serde_json::json!(1))]);
        let err = apply_overrides(&mut constants, &overrides)
            .unwrap_err()
            .to_string();
        assert!(err.contains("unknown override key"));
        assert!(err.contains("nonexistent_field"));
    }

    #[test]
    fn test_type_mismatch_errors() {
        let mut constants = Constants::default();
        let overrides = HashMap::from([(
            "spin_duration_ms".to_string(),
            serde_json::json!("not_a_number"),
        )]);
        assert!(apply_overrides(&mut constants, &overrides).is_err());
    }

    #[test]
    fn test_zero_rotations_rejected_after_override() {
        let mut constants = Constants::default();
        let overrides = HashMap::from([("spin_extra_rotations".to_string(), serde_json::json!(0))]);
        assert!(apply_overrides(&mut constants, &overrides).is_err());
    }

    #[test]
    fn test_parse_override_reads_json_numbers() {
        let (key, value) = parse_override("cooldown_days = 2").unwrap();
        assert_eq!(key, "cooldown_days");
        assert_eq!(value, serde_json::json!(2));
    }

    #[test]
    fn test_parse_override_requires_equals() {
        assert!(parse_override("cooldown_days").is_err());
        assert!(parse_override("=3").is_err());
    }
}
