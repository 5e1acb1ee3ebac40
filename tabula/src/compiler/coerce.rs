//! Coercions specific to schema attributes.

use crate::descriptor::{KeepDeletedCells, SchemaEnum, FOREVER};
use crate::schema::bag::{coerce_i32, coerce_string};
use crate::{Error, Result};
use serde_json::Value;

/// Enum-typed value from a string (booleans and numbers are rendered first).
pub fn coerce_enum<E: SchemaEnum>(field: &str, value: &Value) -> Result<E> {
    let raw = coerce_string(field, value)?;
    E::parse(field, &raw)
}

/// `KEEP_DELETED_CELLS` also takes plain booleans.
pub fn coerce_keep_deleted(field: &str, value: &Value) -> Result<KeepDeletedCells> {
    match value {
        Value::Bool(true) => Ok(KeepDeletedCells::True),
        Value::Bool(false) => Ok(KeepDeletedCells::False),
        other => coerce_enum(field, other),
    }
}

/// TTL in seconds: an integer, `FOREVER`, or an interval such as
/// `1 DAY 2 HOURS 30 SECONDS`.
pub fn coerce_ttl(field: &str, value: &Value) -> Result<i32> {
    if let Value::Number(_) = value {
        return coerce_i32(field, value);
    }
    let raw = coerce_string(field, value)?;
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("FOREVER") {
        return Ok(FOREVER);
    }
    if let Ok(seconds) = trimmed.parse::<i32>() {
        return Ok(seconds);
    }
    parse_interval(trimmed).ok_or_else(|| Error::invalid_type(field, "TTL interval", value))
}

fn parse_interval(raw: &str) -> Option<i32> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() % 2 != 0 {
        return None;
    }
    let mut total: i64 = 0;
    for pair in tokens.chunks(2) {
        let amount: i64 = pair[0].parse().ok()?;
        if amount < 0 {
            return None;
        }
        let unit = pair[1].to_ascii_uppercase();
        let multiplier = match unit.trim_end_matches('S') {
            "DAY" => 86_400,
            "HOUR" => 3_600,
            "MINUTE" => 60,
            "SECOND" => 1,
            _ => return None,
        };
        total = total.checked_add(amount.checked_mul(multiplier)?)?;
    }
    i32::try_from(total).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Compression;
    use serde_json::json;

    #[test]
    fn test_ttl_forms() {
        assert_eq!(coerce_ttl("TTL", &json!(100)).unwrap(), 100);
        assert_eq!(coerce_ttl("TTL", &json!("100")).unwrap(), 100);
        assert_eq!(coerce_ttl("TTL", &json!("forever")).unwrap(), FOREVER);
        assert_eq!(coerce_ttl("TTL", &json!("1 DAY")).unwrap(), 86_400);
        assert_eq!(
            coerce_ttl("TTL", &json!("1 day 2 hours 30 seconds")).unwrap(),
            86_400 + 7_200 + 30
        );
    }

    #[test]
    fn test_ttl_rejects_garbage() {
        assert!(matches!(
            coerce_ttl("TTL", &json!("2 FORTNIGHTS")),
            Err(Error::InvalidType { .. })
        ));
        assert!(coerce_ttl("TTL", &json!("DAY 1")).is_err());
        assert!(coerce_ttl("TTL", &json!(true)).is_err());
        assert!(coerce_ttl("TTL", &json!("30000 DAYS")).is_err());
    }

    #[test]
    fn test_enum_is_case_insensitive() {
        let c: Compression = coerce_enum("COMPRESSION", &json!("snappy")).unwrap();
        assert_eq!(c, Compression::Snappy);
        let err = coerce_enum::<Compression>("COMPRESSION", &json!("BROTLI")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "COMPRESSION BROTLI is not supported. Use one of NONE GZ LZO SNAPPY LZ4 BZIP2 ZSTD"
        );
    }

    #[test]
    fn test_keep_deleted_accepts_booleans() {
        assert_eq!(
            coerce_keep_deleted("KEEP_DELETED_CELLS", &json!(true)).unwrap(),
            KeepDeletedCells::True
        );
        assert_eq!(
            coerce_keep_deleted("KEEP_DELETED_CELLS", &json!("ttl")).unwrap(),
            KeepDeletedCells::Ttl
        );
    }
}
