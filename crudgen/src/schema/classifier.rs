//! SQL column type classification
//!
//! Maps a raw MySQL column type such as `int(11) unsigned` or
//! `varchar(500)` to a semantic category and derives the default language
//! type, protocol type and UI widget for it.
//!
//! # Categories
//!
//! - `string` - char, varchar, varchar2, tinytext, text, mediumtext, longtext, binary, varbinary, blob
//! - `date` - date
//! - `time` - datetime, time, timestamp
//! - `numeric` - tinyint, smallint, mediumint, int, integer, bigint, float, double, decimal, numeric, bit
//!
//! Anything else is [`SqlCategory::Other`] and is treated as a string downstream.

use serde::Serialize;
use std::fmt;

const STRING_TYPES: &[&str] = &[
    "char",
    "varchar",
    "varchar2",
    "tinytext",
    "text",
    "mediumtext",
    "longtext",
    "binary",
    "varbinary",
    "blob",
];
const DATE_TYPES: &[&str] = &["date"];
const TIME_TYPES: &[&str] = &["datetime", "time", "timestamp"];
const NUMERIC_TYPES: &[&str] = &[
    "tinyint",
    "smallint",
    "mediumint",
    "int",
    "integer",
    "bigint",
    "float",
    "double",
    "decimal",
    "numeric",
    "bit",
];

/// Declared length from which string columns get a multi-line widget
pub const LONG_TEXT_LENGTH: u32 = 500;

/// Semantic category of a SQL type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlCategory {
    /// Character and binary string types
    String,
    /// Calendar date without time
    Date,
    /// Date with time, or time of day
    Time,
    /// Integer, floating point and bit types
    Numeric,
    /// Unrecognised type
    #[default]
    Other,
}

impl fmt::Display for SqlCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Numeric => write!(f, "numeric"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Parsed shape of a SQL column type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlShape {
    /// Lower-cased base type without length or modifiers (e.g. `int`)
    pub base_type: String,
    /// Semantic category of the base type
    pub category: SqlCategory,
    /// Whether the second token is `unsigned`
    pub unsigned: bool,
    /// Declared length, when the type carries a numeric one
    pub length: Option<u32>,
}

impl SqlShape {
    /// Parse a raw SQL type
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::schema::classifier::{SqlCategory, SqlShape};
    /// let shape = SqlShape::parse("int(10) unsigned");
    /// assert_eq!(shape.base_type, "int");
    /// assert_eq!(shape.category, SqlCategory::Numeric);
    /// assert!(shape.unsigned);
    /// assert_eq!(shape.length, Some(10));
    ///
    /// let shape = SqlShape::parse("varchar(500)");
    /// assert_eq!(shape.length, Some(500));
    /// ```
    #[must_use]
    pub fn parse(sql_type: &str) -> Self {
        let (stripped, length) = strip_length(sql_type);
        let mut tokens = stripped.split_whitespace();
        let base_type = tokens.next().unwrap_or_default().to_lowercase();
        let unsigned = tokens
            .next()
            .is_some_and(|token| token.eq_ignore_ascii_case("unsigned"));
        let category = category_of(&base_type);

        Self {
            base_type,
            category,
            unsigned,
            length,
        }
    }

    /// Default language type for this shape
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::schema::classifier::SqlShape;
    /// assert_eq!(SqlShape::parse("bigint unsigned").language_type(), "uint64");
    /// assert_eq!(SqlShape::parse("decimal(10,2)").language_type(), "float64");
    /// assert_eq!(SqlShape::parse("datetime").language_type(), "Time");
    /// ```
    #[must_use]
    pub fn language_type(&self) -> &'static str {
        match self.category {
            SqlCategory::Date | SqlCategory::Time => "Time",
            SqlCategory::Numeric => match self.base_type.as_str() {
                "float" | "double" | "decimal" | "numeric" => "float64",
                "bigint" if self.unsigned => "uint64",
                "bigint" => "int64",
                "bit" => "bool",
                _ if self.unsigned => "uint32",
                _ => "int32",
            },
            SqlCategory::String | SqlCategory::Other => "string",
        }
    }

    /// Default UI widget for this shape
    #[must_use]
    pub fn widget_type(&self) -> &'static str {
        match self.category {
            SqlCategory::String if self.length.unwrap_or(0) >= LONG_TEXT_LENGTH => "textarea",
            SqlCategory::Date => "date",
            SqlCategory::Time => "datetime",
            SqlCategory::Numeric if self.base_type == "bit" => "select",
            _ => "input",
        }
    }
}

/// Classify a raw SQL type into its category and signedness
///
/// # Examples
///
/// ```
/// # use crudgen::schema::classifier::{classify, SqlCategory};
/// assert_eq!(classify("int(11) unsigned"), (SqlCategory::Numeric, true));
/// assert_eq!(classify("VARCHAR(64)"), (SqlCategory::String, false));
/// assert_eq!(classify("json"), (SqlCategory::Other, false));
/// ```
#[must_use]
pub fn classify(sql_type: &str) -> (SqlCategory, bool) {
    let shape = SqlShape::parse(sql_type);
    (shape.category, shape.unsigned)
}

/// Normalise a language type to its canonical spelling
///
/// `int` and `uint` are accepted in definitions but rendered as their
/// 32-bit forms.
#[must_use]
pub fn normalize_language_type(go_type: &str) -> String {
    match go_type {
        "int" => "int32".to_string(),
        "uint" => "uint32".to_string(),
        other => other.to_string(),
    }
}

/// Protocol wire type for a resolved language type
///
/// # Examples
///
/// ```
/// # use crudgen::schema::classifier::protocol_type;
/// assert_eq!(protocol_type("Time"), "string");
/// assert_eq!(protocol_type("float64"), "double");
/// assert_eq!(protocol_type("uint32"), "uint32");
/// ```
#[must_use]
pub fn protocol_type(go_type: &str) -> String {
    match go_type {
        "Time" => "string".to_string(),
        "float64" => "double".to_string(),
        other => normalize_language_type(other),
    }
}

fn category_of(base_type: &str) -> SqlCategory {
    if STRING_TYPES.contains(&base_type) {
        SqlCategory::String
    } else if DATE_TYPES.contains(&base_type) {
        SqlCategory::Date
    } else if TIME_TYPES.contains(&base_type) {
        SqlCategory::Time
    } else if NUMERIC_TYPES.contains(&base_type) {
        SqlCategory::Numeric
    } else {
        SqlCategory::Other
    }
}

/// Remove the parenthesised suffix and return the leading length inside it
fn strip_length(sql_type: &str) -> (String, Option<u32>) {
    let trimmed = sql_type.trim();
    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(start), Some(end)) if start < end => {
            let inner = &trimmed[start + 1..end];
            let length = inner
                .split(',')
                .next()
                .and_then(|value| value.trim().parse().ok());
            let stripped = format!("{}{}", &trimmed[..start], &trimmed[end + 1..]);
            (stripped, length)
        }
        _ => (trimmed.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_strips_length_and_case() {
        let shape = SqlShape::parse("  BIGINT(20) UNSIGNED ");
        assert_eq!(shape.base_type, "bigint");
        assert!(shape.unsigned);
        assert_eq!(shape.length, Some(20));
        assert_eq!(shape.language_type(), "uint64");
    }

    #[test]
    fn test_decimal_length_is_precision() {
        let shape = SqlShape::parse("decimal(10,2)");
        assert_eq!(shape.length, Some(10));
        assert_eq!(shape.category, SqlCategory::Numeric);
    }

    #[test]
    fn test_enum_values_are_not_a_length() {
        let shape = SqlShape::parse("enum('a','b')");
        assert_eq!(shape.base_type, "enum");
        assert_eq!(shape.length, None);
        assert_eq!(shape.category, SqlCategory::Other);
        assert_eq!(shape.language_type(), "string");
        assert_eq!(shape.widget_type(), "input");
    }

    #[test]
    fn test_widget_types() {
        assert_eq!(SqlShape::parse("varchar(500)").widget_type(), "textarea");
        assert_eq!(SqlShape::parse("varchar(499)").widget_type(), "input");
        assert_eq!(SqlShape::parse("text").widget_type(), "input");
        assert_eq!(SqlShape::parse("date").widget_type(), "date");
        assert_eq!(SqlShape::parse("timestamp").widget_type(), "datetime");
        assert_eq!(SqlShape::parse("int(11)").widget_type(), "input");
        assert_eq!(SqlShape::parse("bit(1)").widget_type(), "select");
    }

    #[test]
    fn test_bit_is_bool() {
        assert_eq!(SqlShape::parse("bit(1)").language_type(), "bool");
    }

    #[test]
    fn test_protocol_type_normalises_int() {
        assert_eq!(protocol_type("int"), "int32");
        assert_eq!(protocol_type("uint"), "uint32");
        assert_eq!(protocol_type("string"), "string");
    }

    #[test]
    fn test_unsigned_requires_second_token() {
        assert_eq!(classify("unsigned"), (SqlCategory::Other, false));
        assert_eq!(classify("int zerofill unsigned"), (SqlCategory::Numeric, false));
    }

    proptest! {
        #[test]
        fn prop_int_family_signedness(
            base in prop::sample::select(vec!["tinyint", "smallint", "mediumint", "int", "integer"]),
            width in 1u32..=255,
            unsigned in any::<bool>(),
        ) {
            let sql = if unsigned {
                format!("{base}({width}) unsigned")
            } else {
                format!("{base}({width})")
            };
            let shape = SqlShape::parse(&sql);
            prop_assert_eq!(shape.category, SqlCategory::Numeric);
            prop_assert_eq!(shape.unsigned, unsigned);
            let expected = if unsigned { "uint32" } else { "int32" };
            prop_assert_eq!(shape.language_type(), expected);
        }

        #[test]
        fn prop_bigint_signedness(width in 1u32..=255, unsigned in any::<bool>()) {
            let suffix = if unsigned { " unsigned" } else { "" };
            let shape = SqlShape::parse(&format!("bigint({width}){suffix}"));
            let expected = if unsigned { "uint64" } else { "int64" };
            prop_assert_eq!(shape.language_type(), expected);
        }

        #[test]
        fn prop_string_length_threshold(length in 1u32..=4000) {
            let shape = SqlShape::parse(&format!("varchar({length})"));
            let expected = if length >= LONG_TEXT_LENGTH { "textarea" } else { "input" };
            prop_assert_eq!(shape.widget_type(), expected);
        }
    }
}
