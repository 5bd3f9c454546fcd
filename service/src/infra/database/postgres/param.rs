//! [`Param`] definitions.

use std::error::Error as StdError;

use bytes::BytesMut;
use derive_more::{Display, From};
use postgres_types::{IsNull, ToSql, Type};

/// Value bound to a positional placeholder of a [`Query`].
///
/// [`Query`]: super::query_builder::Query
#[derive(Clone, Copy, Debug, Display, From, PartialEq)]
pub enum Param {
    /// `INT4` value.
    Int4(i32),

    /// `INT8` value.
    Int8(i64),

    /// `FLOAT8` value.
    Float8(f64),
}

impl Param {
    /// Returns the SQL type this [`Param`] is cast to in a placeholder.
    #[must_use]
    pub const fn sql_type(&self) -> &'static str {
        match self {
            Self::Int4(_) => "INT4",
            Self::Int8(_) => "INT8",
            Self::Float8(_) => "FLOAT8",
        }
    }
}

impl ToSql for Param {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        match self {
            Self::Int4(v) => v.to_sql(ty, out),
            Self::Int8(v) => v.to_sql(ty, out),
            Self::Float8(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <i32 as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
    }

    // Checks against the variant, as `accepts()` admits any of them.
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        match self {
            Self::Int4(v) => v.to_sql_checked(ty, out),
            Self::Int8(v) => v.to_sql_checked(ty, out),
            Self::Float8(v) => v.to_sql_checked(ty, out),
        }
    }
}
