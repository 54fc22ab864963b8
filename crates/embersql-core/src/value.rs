//! SQL values and host-type mapping.
//!
//! Everything that crosses the statement boundary travels as a [`SqlValue`],
//! a closed sum over the SQLite storage classes. Host scalars convert exactly
//! once, at the call boundary, through [`ToSqlValue`] — there is no
//! open-ended runtime type testing anywhere downstream.

/// A SQLite storage class, as declared in DDL or reported for a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Signed integer storage.
    Integer,
    /// 8-byte IEEE float storage.
    Real,
    /// UTF-8 text storage.
    Text,
    /// Raw byte storage.
    Blob,
    /// SQL NULL. Only ever reported for result columns; never declared.
    Null,
}

impl ColumnType {
    /// Returns the DDL spelling of this storage class.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Null => "NULL",
        }
    }
}

/// Canonical host scalar kinds an entity field can carry.
///
/// `Other` is the explicit fallback for anything outside the canonical set:
/// it is stored as TEXT via its string representation, never silently
/// dropped and never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// Boolean, stored as integer 0/1.
    Bool,
    /// UTF-8 string.
    Text,
    /// 64-bit float.
    Double,
    /// 32-bit float; promoted to 64-bit on bind, truncated on read.
    Float,
    /// Byte sequence.
    Bytes,
    /// Any other kind, carried as its string representation.
    Other,
}

impl ScalarKind {
    /// Default storage-class inference for this kind.
    ///
    /// An explicit per-column [`ColumnType`] override takes precedence over
    /// this mapping (see `ColumnDescriptor::storage_class`).
    #[must_use]
    pub fn storage_class(self) -> ColumnType {
        match self {
            Self::Int | Self::BigInt | Self::Bool => ColumnType::Integer,
            Self::Double | Self::Float => ColumnType::Real,
            Self::Bytes => ColumnType::Blob,
            Self::Text | Self::Other => ColumnType::Text,
        }
    }
}

/// A value bound to, or read from, a statement parameter or column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Integer value (also carries booleans as 0/1).
    Integer(i64),
    /// Float value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the storage class this value occupies.
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Null => ColumnType::Null,
            Self::Integer(_) => ColumnType::Integer,
            Self::Real(_) => ColumnType::Real,
            Self::Text(_) => ColumnType::Text,
            Self::Blob(_) => ColumnType::Blob,
        }
    }
}

/// Trait for host types that convert into a [`SqlValue`].
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for i8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for u16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for u8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Real(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Real(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_class_inference() {
        assert_eq!(ScalarKind::Int.storage_class(), ColumnType::Integer);
        assert_eq!(ScalarKind::BigInt.storage_class(), ColumnType::Integer);
        assert_eq!(ScalarKind::Bool.storage_class(), ColumnType::Integer);
        assert_eq!(ScalarKind::Text.storage_class(), ColumnType::Text);
        assert_eq!(ScalarKind::Double.storage_class(), ColumnType::Real);
        assert_eq!(ScalarKind::Float.storage_class(), ColumnType::Real);
        assert_eq!(ScalarKind::Bytes.storage_class(), ColumnType::Blob);
    }

    #[test]
    fn test_unrecognized_kind_falls_back_to_text() {
        assert_eq!(ScalarKind::Other.storage_class(), ColumnType::Text);
    }

    #[test]
    fn test_bool_converts_to_integer() {
        assert_eq!(true.to_sql_value(), SqlValue::Integer(1));
        assert_eq!(false.to_sql_value(), SqlValue::Integer(0));
    }

    #[test]
    fn test_float_promotes_to_double() {
        assert_eq!(2.5_f32.to_sql_value(), SqlValue::Real(2.5));
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(42_i32.to_sql_value(), SqlValue::Integer(42));
        assert_eq!(42_i64.to_sql_value(), SqlValue::Integer(42));
        assert_eq!("hello".to_sql_value(), SqlValue::Text(String::from("hello")));
        assert_eq!(vec![1_u8, 2, 3].to_sql_value(), SqlValue::Blob(vec![1, 2, 3]));
    }

    #[test]
    fn test_option_conversions() {
        assert_eq!(None::<i64>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(7_i64).to_sql_value(), SqlValue::Integer(7));
        assert_eq!(
            Some(String::from("x")).to_sql_value(),
            SqlValue::Text(String::from("x"))
        );
    }

    #[test]
    fn test_value_reports_its_column_type() {
        assert_eq!(SqlValue::Null.column_type(), ColumnType::Null);
        assert_eq!(SqlValue::Integer(1).column_type(), ColumnType::Integer);
        assert_eq!(SqlValue::Real(1.0).column_type(), ColumnType::Real);
        assert_eq!(SqlValue::Text(String::new()).column_type(), ColumnType::Text);
        assert_eq!(SqlValue::Blob(Vec::new()).column_type(), ColumnType::Blob);
    }
}
