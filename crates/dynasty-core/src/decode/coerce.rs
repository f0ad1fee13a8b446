// Lenient scalar coercion. The provider sends almost every number as a
// string, but not consistently: some seasons send bare numbers, some send
// "" for "not yet known".

use serde_json::Value;

use super::EntryError;

/// A string or number rendered as an owned string. Empty strings count as
/// absent.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Provider boolean: "1", 1, or true.
pub fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.trim() == "1",
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn bad_number(field: &'static str, value: &Value) -> EntryError {
    EntryError::BadNumber {
        field,
        value: value.to_string(),
    }
}

/// Optional unsigned integer: absent or blank is `None`, anything else must
/// parse.
pub fn opt_u32(value: Option<&Value>, field: &'static str) -> Result<Option<u32>, EntryError> {
    let Some(value) = value.filter(|v| !is_blank(v)) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::String(s) => s.trim().parse::<u32>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| bad_number(field, value))
}

/// Required unsigned integer.
pub fn req_u32(value: Option<&Value>, field: &'static str) -> Result<u32, EntryError> {
    opt_u32(value, field)?.ok_or(EntryError::MissingField(field))
}

/// Optional 64-bit unsigned integer (ids, epoch timestamps).
pub fn opt_u64(value: Option<&Value>, field: &'static str) -> Result<Option<u64>, EntryError> {
    let Some(value) = value.filter(|v| !is_blank(v)) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| bad_number(field, value))
}

/// Optional float: absent or blank is `None`; non-finite values are rejected.
pub fn opt_f64(value: Option<&Value>, field: &'static str) -> Result<Option<f64>, EntryError> {
    let Some(value) = value.filter(|v| !is_blank(v)) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .map(Some)
        .ok_or_else(|| bad_number(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_parse_from_strings_and_numbers() {
        assert_eq!(req_u32(Some(&json!("9")), "wins"), Ok(9));
        assert_eq!(req_u32(Some(&json!(9)), "wins"), Ok(9));
        assert_eq!(opt_f64(Some(&json!(".692")), "pct"), Ok(Some(0.692)));
        assert_eq!(opt_f64(Some(&json!(101.5)), "pts"), Ok(Some(101.5)));
        assert_eq!(opt_u64(Some(&json!("1694400000")), "ts"), Ok(Some(1_694_400_000)));
    }

    #[test]
    fn blank_and_absent_are_none() {
        assert_eq!(opt_u32(None, "ties"), Ok(None));
        assert_eq!(opt_u32(Some(&json!("")), "ties"), Ok(None));
        assert_eq!(opt_f64(Some(&Value::Null), "pts"), Ok(None));
        assert_eq!(req_u32(Some(&json!("")), "rank"), Err(EntryError::MissingField("rank")));
    }

    #[test]
    fn malformed_numbers_are_errors() {
        assert!(matches!(
            req_u32(Some(&json!("nine")), "wins"),
            Err(EntryError::BadNumber { field: "wins", .. })
        ));
        assert!(opt_u32(Some(&json!(-3)), "wins").is_err());
        assert!(opt_f64(Some(&json!("NaN")), "pts").is_err());
    }

    #[test]
    fn flags_and_text() {
        assert!(flag(Some(&json!("1"))));
        assert!(flag(Some(&json!(1))));
        assert!(flag(Some(&json!(true))));
        assert!(!flag(Some(&json!("0"))));
        assert!(!flag(None));
        assert_eq!(text(Some(&json!(" Team "))), Some("Team".to_string()));
        assert_eq!(text(Some(&json!(12))), Some("12".to_string()));
        assert_eq!(text(Some(&json!(""))), None);
        assert_eq!(text(Some(&json!({"full": "x"}))), None);
    }
}
