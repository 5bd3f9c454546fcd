//! [`Record`] definitions.

use common::DateTime;
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tokio_postgres::{
    types::{FromSql, Type},
    Row,
};

/// Single value of a [`Record`].
#[derive(Clone, Debug, From, PartialEq)]
pub enum Value {
    /// `NULL` value.
    #[from(ignore)]
    Null,

    /// `INT4` value, also holding widened `INT2` ones.
    Int4(i32),

    /// `INT8` value.
    Int8(i64),

    /// `FLOAT8` value, also holding widened `FLOAT4` ones.
    Float8(f64),

    /// `NUMERIC` value.
    Numeric(Decimal),

    /// `TEXT` value, also holding `VARCHAR` ones.
    Text(String),

    /// `TIMESTAMP` or `TIMESTAMPTZ` value, normalized to UTC.
    Timestamp(DateTime),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl Value {
    /// Returns the [`ValueType`] of this [`Value`].
    #[must_use]
    pub const fn ty(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Int4(_) => ValueType::Int4,
            Self::Int8(_) => ValueType::Int8,
            Self::Float8(_) => ValueType::Float8,
            Self::Numeric(_) => ValueType::Numeric,
            Self::Text(_) => ValueType::Text,
            Self::Timestamp(_) => ValueType::Timestamp,
        }
    }
}

/// Type of a [`Value`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ValueType {
    /// [`Value::Null`].
    #[display("NULL")]
    Null,

    /// [`Value::Int4`].
    #[display("INT4")]
    Int4,

    /// [`Value::Int8`].
    #[display("INT8")]
    Int8,

    /// [`Value::Float8`].
    #[display("FLOAT8")]
    Float8,

    /// [`Value::Numeric`].
    #[display("NUMERIC")]
    Numeric,

    /// [`Value::Text`].
    #[display("TEXT")]
    Text,

    /// [`Value::Timestamp`].
    #[display("TIMESTAMP")]
    Timestamp,
}

/// Positional row of typed [`Value`]s.
#[derive(Clone, Debug, Default, From, PartialEq)]
pub struct Record(Vec<Value>);

impl Record {
    /// Creates a new [`Record`] out of the provided [`Value`]s.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self(values.into_iter().collect())
    }

    /// Decodes the provided [`Row`] into a [`Record`].
    ///
    /// # Errors
    ///
    /// If any column of the [`Row`] has an unsupported type or fails to
    /// decode.
    pub fn decode(row: &Row) -> Result<Self, ScanError> {
        row.columns()
            .iter()
            .enumerate()
            .map(|(i, col)| decode_value(row, i, col.type_()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Returns the number of [`Value`]s in this [`Record`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether this [`Record`] has no [`Value`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the [`Value`]s of this [`Record`].
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Consumes this [`Record`] returning its [`Value`]s.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

/// Decodes the `i`th column of the provided [`Row`] having the `ty`pe.
fn decode_value(row: &Row, i: usize, ty: &Type) -> Result<Value, ScanError> {
    /// Gets the `i`th column as an optional `T` and converts it.
    fn get<'a, T, V>(row: &'a Row, i: usize) -> Result<Value, ScanError>
    where
        T: FromSql<'a>,
        V: From<T> + Into<Value>,
    {
        row.try_get::<_, Option<T>>(i)
            .map(|v| v.map_or(Value::Null, |v| V::from(v).into()))
            .map_err(|source| ScanError::Decode { column: i, source })
    }

    if <i16 as FromSql>::accepts(ty) {
        get::<i16, i32>(row, i)
    } else if <i32 as FromSql>::accepts(ty) {
        get::<i32, i32>(row, i)
    } else if <i64 as FromSql>::accepts(ty) {
        get::<i64, i64>(row, i)
    } else if <f32 as FromSql>::accepts(ty) {
        get::<f32, f64>(row, i)
    } else if <f64 as FromSql>::accepts(ty) {
        get::<f64, f64>(row, i)
    } else if <Decimal as FromSql>::accepts(ty) {
        get::<Decimal, Decimal>(row, i)
    } else if <DateTime as FromSql>::accepts(ty) {
        get::<DateTime, DateTime>(row, i)
    } else if <String as FromSql>::accepts(ty) {
        get::<String, String>(row, i)
    } else {
        Err(ScanError::UnsupportedType {
            column: i,
            ty: ty.clone(),
        })
    }
}

/// Error of scanning a database row.
#[derive(Debug, Display, Error)]
pub enum ScanError {
    /// Column has a type not representable as a [`Value`].
    #[display("column #{column} has unsupported type `{ty}`")]
    UnsupportedType {
        /// Index of the column.
        column: usize,

        /// Type of the column.
        ty: Type,
    },

    /// Column failed to decode.
    #[display("column #{column} failed to decode: {source}")]
    Decode {
        /// Index of the column.
        column: usize,

        /// Decoding error.
        source: tokio_postgres::Error,
    },

    /// [`Record`] has a different number of [`Value`]s than expected.
    #[display("expected {expected} columns, got {actual}")]
    ColumnCount {
        /// Expected number of columns.
        expected: usize,

        /// Actual number of columns.
        actual: usize,
    },

    /// [`Value`] has a different [`ValueType`] than its column declares.
    #[display("column `{column}` expected to be `{expected}`, got `{actual}`")]
    TypeMismatch {
        /// Name of the column.
        column: &'static str,

        /// Declared [`ValueType`] of the column.
        expected: ValueType,

        /// Actual [`ValueType`] of the [`Value`].
        actual: ValueType,
    },
}
