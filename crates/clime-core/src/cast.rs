//! Metavar-driven conversion of raw tokens into [`Value`]s.

use crate::error::ParseError;
use crate::value::Value;

/// Caster selected by a metavar such as `<int>`, `N` or `json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caster {
    /// No (recognised) metavar: integer, then float, then the string itself.
    Auto,
    Int,
    Str,
    Json,
}

impl Caster {
    /// Metavars are case-insensitive and may be wrapped in `<...>`. Unknown
    /// metavars are labels only and fall back to [`Caster::Auto`].
    pub fn from_metavar(meta: Option<&str>) -> Self {
        let Some(meta) = meta else {
            return Self::Auto;
        };
        let meta = meta
            .trim_start_matches('<')
            .trim_end_matches('>')
            .to_ascii_lowercase();
        match meta.as_str() {
            "n" | "num" | "number" | "i" | "int" | "integer" => Self::Int,
            "s" | "str" | "string" => Self::Str,
            "json" => Self::Json,
            _ => Self::Auto,
        }
    }

    pub fn expected(self) -> &'static str {
        match self {
            Self::Auto => "a value",
            Self::Int => "int",
            Self::Str => "str",
            Self::Json => "json",
        }
    }

    /// Cast `raw`, naming `option` in the error if it does not convert.
    pub fn cast(self, option: &str, raw: &str) -> Result<Value, ParseError> {
        let invalid = || ParseError::InvalidValue {
            option: option.to_string(),
            value: raw.to_string(),
            expected: self.expected(),
        };
        match self {
            Self::Auto => Ok(autotype(raw)),
            Self::Str => Ok(Value::Str(raw.to_string())),
            Self::Int => raw.trim().parse().map(Value::Int).map_err(|_| invalid()),
            Self::Json => serde_json::from_str(raw).map(Value::Json).map_err(|_| invalid()),
        }
    }
}

/// Detect an integer, then a float, else keep the string unchanged.
pub fn autotype(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(x) = raw.parse::<f64>() {
        return Value::Float(x);
    }
    Value::Str(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metavar_table() {
        for meta in ["N", "num", "<NUMBER>", "i", "<int>", "Integer"] {
            assert_eq!(Caster::from_metavar(Some(meta)), Caster::Int, "{meta}");
        }
        for meta in ["s", "<str>", "STRING"] {
            assert_eq!(Caster::from_metavar(Some(meta)), Caster::Str, "{meta}");
        }
        assert_eq!(Caster::from_metavar(Some("<json>")), Caster::Json);
        assert_eq!(Caster::from_metavar(Some("<file>")), Caster::Auto);
        assert_eq!(Caster::from_metavar(None), Caster::Auto);
    }

    #[test]
    fn autotype_prefers_int_then_float() {
        assert_eq!(autotype("string"), Value::from("string"));
        assert_eq!(autotype("100"), Value::Int(100));
        assert_eq!(autotype("-3"), Value::Int(-3));
        assert_eq!(autotype("100.0"), Value::Float(100.0));
        assert_eq!(autotype(""), Value::from(""));
    }

    #[test]
    fn casters_convert_or_fail_with_option_name() {
        assert_eq!(Caster::Str.cast("m", "42"), Ok(Value::from("42")));
        assert_eq!(Caster::Int.cast("times", "42"), Ok(Value::Int(42)));
        assert_eq!(
            Caster::Json.cast("data", r#"{"k": [1]}"#),
            Ok(Value::Json(serde_json::json!({"k": [1]})))
        );

        let err = Caster::Int.cast("times", "abc").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidValue {
                option: "times".to_string(),
                value: "abc".to_string(),
                expected: "int",
            }
        );
        assert_eq!(err.to_string(), "option 'times' must be int, got 'abc'");
        assert!(Caster::Json.cast("data", "{oops").is_err());
    }
}
