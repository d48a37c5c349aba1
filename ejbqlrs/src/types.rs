//! JDBC type codes and their SQL / Java names.
//!
//! `#bind` directives carry SQL type names, `#result` directives carry the
//! Java type and the numeric JDBC code.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JdbcType {
    Bit,
    #[serde(rename = "TINYINT")]
    TinyInt,
    #[serde(rename = "SMALLINT")]
    SmallInt,
    Integer,
    #[serde(rename = "BIGINT")]
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    #[serde(rename = "LONGVARCHAR")]
    LongVarchar,
    Date,
    Time,
    Timestamp,
    Binary,
    #[serde(rename = "VARBINARY")]
    VarBinary,
    #[serde(rename = "LONGVARBINARY")]
    LongVarBinary,
    Blob,
    Clob,
    Boolean,
    Other,
}

static JAVA_TYPES: Lazy<HashMap<&'static str, JdbcType>> = Lazy::new(|| {
    HashMap::from([
        ("java.lang.String", JdbcType::Varchar),
        ("java.lang.Integer", JdbcType::Integer),
        ("int", JdbcType::Integer),
        ("java.lang.Long", JdbcType::BigInt),
        ("long", JdbcType::BigInt),
        ("java.lang.Short", JdbcType::SmallInt),
        ("short", JdbcType::SmallInt),
        ("java.lang.Byte", JdbcType::TinyInt),
        ("byte", JdbcType::TinyInt),
        ("java.lang.Boolean", JdbcType::Boolean),
        ("boolean", JdbcType::Boolean),
        ("java.lang.Double", JdbcType::Double),
        ("double", JdbcType::Double),
        ("java.lang.Float", JdbcType::Float),
        ("float", JdbcType::Float),
        ("java.math.BigDecimal", JdbcType::Decimal),
        ("java.math.BigInteger", JdbcType::BigInt),
        ("java.lang.Character", JdbcType::Char),
        ("char", JdbcType::Char),
        ("java.util.Date", JdbcType::Timestamp),
        ("java.sql.Date", JdbcType::Date),
        ("java.sql.Time", JdbcType::Time),
        ("java.sql.Timestamp", JdbcType::Timestamp),
        ("java.time.LocalDate", JdbcType::Date),
        ("java.time.LocalTime", JdbcType::Time),
        ("java.time.LocalDateTime", JdbcType::Timestamp),
        ("byte[]", JdbcType::VarBinary),
    ])
});

impl JdbcType {
    /// Numeric type code as defined by `java.sql.Types`.
    pub fn code(self) -> i32 {
        match self {
            JdbcType::Bit => -7,
            JdbcType::TinyInt => -6,
            JdbcType::SmallInt => 5,
            JdbcType::Integer => 4,
            JdbcType::BigInt => -5,
            JdbcType::Float => 6,
            JdbcType::Real => 7,
            JdbcType::Double => 8,
            JdbcType::Numeric => 2,
            JdbcType::Decimal => 3,
            JdbcType::Char => 1,
            JdbcType::Varchar => 12,
            JdbcType::LongVarchar => -1,
            JdbcType::Date => 91,
            JdbcType::Time => 92,
            JdbcType::Timestamp => 93,
            JdbcType::Binary => -2,
            JdbcType::VarBinary => -3,
            JdbcType::LongVarBinary => -4,
            JdbcType::Blob => 2004,
            JdbcType::Clob => 2005,
            JdbcType::Boolean => 16,
            JdbcType::Other => 1111,
        }
    }

    /// SQL type name used inside `#bind(...)`.
    pub fn sql_name(self) -> &'static str {
        match self {
            JdbcType::Bit => "BIT",
            JdbcType::TinyInt => "TINYINT",
            JdbcType::SmallInt => "SMALLINT",
            JdbcType::Integer => "INTEGER",
            JdbcType::BigInt => "BIGINT",
            JdbcType::Float => "FLOAT",
            JdbcType::Real => "REAL",
            JdbcType::Double => "DOUBLE",
            JdbcType::Numeric => "NUMERIC",
            JdbcType::Decimal => "DECIMAL",
            JdbcType::Char => "CHAR",
            JdbcType::Varchar => "VARCHAR",
            JdbcType::LongVarchar => "LONGVARCHAR",
            JdbcType::Date => "DATE",
            JdbcType::Time => "TIME",
            JdbcType::Timestamp => "TIMESTAMP",
            JdbcType::Binary => "BINARY",
            JdbcType::VarBinary => "VARBINARY",
            JdbcType::LongVarBinary => "LONGVARBINARY",
            JdbcType::Blob => "BLOB",
            JdbcType::Clob => "CLOB",
            JdbcType::Boolean => "BOOLEAN",
            JdbcType::Other => "OTHER",
        }
    }

    /// Java class a column of this type is read into when the object layer
    /// doesn't say otherwise.
    pub fn default_java_type(self) -> &'static str {
        match self {
            JdbcType::Bit | JdbcType::Boolean => "java.lang.Boolean",
            JdbcType::TinyInt => "java.lang.Byte",
            JdbcType::SmallInt => "java.lang.Short",
            JdbcType::Integer => "java.lang.Integer",
            JdbcType::BigInt => "java.lang.Long",
            JdbcType::Float | JdbcType::Real => "java.lang.Float",
            JdbcType::Double => "java.lang.Double",
            JdbcType::Numeric | JdbcType::Decimal => "java.math.BigDecimal",
            JdbcType::Char | JdbcType::Varchar | JdbcType::LongVarchar | JdbcType::Clob => {
                "java.lang.String"
            }
            JdbcType::Date => "java.sql.Date",
            JdbcType::Time => "java.sql.Time",
            JdbcType::Timestamp => "java.sql.Timestamp",
            JdbcType::Binary | JdbcType::VarBinary | JdbcType::LongVarBinary | JdbcType::Blob => {
                "byte[]"
            }
            JdbcType::Other => "java.lang.Object",
        }
    }

    /// Maps a Java class name to its JDBC type, if known.
    pub fn from_java_type(java_type: &str) -> Option<JdbcType> {
        JAVA_TYPES.get(java_type).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn java_type_lookup() {
        assert_eq!(
            JdbcType::from_java_type("java.lang.String"),
            Some(JdbcType::Varchar)
        );
        assert_eq!(
            JdbcType::from_java_type("java.math.BigDecimal").map(JdbcType::sql_name),
            Some("DECIMAL")
        );
        assert_eq!(JdbcType::from_java_type("com.example.Money"), None);
    }

    #[test]
    fn deserializes_sql_type_names() {
        let types: Vec<JdbcType> = serde_yaml::from_str("[BIGINT, VARCHAR, LONGVARBINARY]").unwrap();
        assert_eq!(types, vec![JdbcType::BigInt, JdbcType::Varchar, JdbcType::LongVarBinary]);
    }

    #[test]
    fn codes_match_java_sql_types() {
        assert_eq!(JdbcType::Varchar.code(), 12);
        assert_eq!(JdbcType::BigInt.code(), -5);
        assert_eq!(JdbcType::Timestamp.code(), 93);
    }
}
