//! Date and time utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::marker::PhantomData;

use derive_more::Debug;
#[cfg(feature = "postgres")]
use postgres_types::{accepts, FromSql, Type};
use time::{format_description::well_known::Rfc3339, UtcOffset};

/// Untyped date and time.
pub type DateTime = DateTimeOf;

/// UTC date and time, tagged with the kind of moment it describes.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Inner representation of the date and time.
    inner: time::OffsetDateTime,

    /// Type parameter describing the kind of date and time.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// A [`DateTime`] representing the Unix epoch.
    pub const UNIX_EPOCH: Self = Self {
        inner: time::OffsetDateTime::UNIX_EPOCH,
        _of: PhantomData,
    };

    /// Creates a new [`DateTime`] from the provided [`UNIX_EPOCH`] timestamp.
    ///
    /// [`None`] is returned if the timestamp is invalid.
    ///
    /// [`UNIX_EPOCH`]: Self::UNIX_EPOCH
    #[must_use]
    pub fn from_unix_timestamp(timestamp: i64) -> Option<Self> {
        Some(Self {
            inner: time::OffsetDateTime::from_unix_timestamp(timestamp).ok()?,
            _of: PhantomData,
        })
    }

    /// Returns the [`DateTime`] as an [RFC 3339] string.
    ///
    /// # Errors
    ///
    /// If the year lies outside `0..=9999`, which [RFC 3339] cannot represent.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn to_rfc3339(&self) -> Result<String, time::error::Format> {
        self.inner.format(&Rfc3339)
    }

    /// Coerces one kind of [`DateTime`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> TryFrom<time::OffsetDateTime> for DateTimeOf<Of> {
    type Error = time::error::ComponentRange;

    fn try_from(dt: time::OffsetDateTime) -> Result<Self, Self::Error> {
        dt.to_offset(UtcOffset::UTC)
            .replace_microsecond(dt.microsecond())
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
    }
}

impl<Of: ?Sized> From<time::PrimitiveDateTime> for DateTimeOf<Of> {
    /// Interprets the zone-less `dt` as UTC.
    fn from(dt: time::PrimitiveDateTime) -> Self {
        Self {
            inner: dt.assume_utc(),
            _of: PhantomData,
        }
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ, TIMESTAMP);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        // `TIMESTAMP` columns carry no zone, and are stored in UTC.
        if *ty == Type::TIMESTAMP {
            return time::PrimitiveDateTime::from_sql(ty, raw).map(Into::into);
        }
        time::OffsetDateTime::from_sql(ty, raw)?
            .try_into()
            .map_err(Box::from)
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! Module providing integration with [`serde`] crate.

    pub mod rfc3339 {
        //! [`DateTimeOf`] rendered as an [RFC 3339] string.
        //!
        //! [RFC 3339]: https://tools.ietf.org/html/rfc3339

        use serde::{ser::Error as _, Serializer};

        use crate::DateTimeOf;

        /// Serializes a [`DateTimeOf`] as an [RFC 3339] string.
        ///
        /// # Errors
        ///
        /// If the [`DateTimeOf`] has no [RFC 3339] representation, or the
        /// [`Serializer`] fails.
        ///
        /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
        pub fn serialize<S, Of>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            Of: ?Sized,
        {
            let s = dt.to_rfc3339().map_err(S::Error::custom)?;
            serializer.serialize_str(&s)
        }
    }
}

#[cfg(test)]
mod spec {
    use time::{Date, Month, PrimitiveDateTime, Time, UtcOffset};

    use super::DateTime;

    fn at(day: u8, hour: u8) -> PrimitiveDateTime {
        PrimitiveDateTime::new(
            Date::from_calendar_date(2023, Month::November, day).unwrap(),
            Time::from_hms(hour, 13, 20).unwrap(),
        )
    }

    #[test]
    fn formats_as_utc_rfc3339() {
        let dt = DateTime::from_unix_timestamp(1_700_000_000).unwrap();

        assert_eq!(dt.to_rfc3339().unwrap(), "2023-11-14T22:13:20Z");
        assert_eq!(
            DateTime::UNIX_EPOCH.to_rfc3339().unwrap(),
            "1970-01-01T00:00:00Z",
        );
    }

    #[test]
    fn fails_to_format_years_before_zero() {
        let bc = DateTime::from_unix_timestamp(-62_200_000_000).unwrap();

        assert!(bc.to_rfc3339().is_err());
    }

    #[test]
    fn assumes_utc_for_zoneless_values() {
        assert_eq!(
            DateTime::from(at(14, 22)),
            DateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        );
    }

    #[test]
    fn normalizes_offset_to_utc() {
        let dt = at(15, 1).assume_offset(UtcOffset::from_hms(3, 0, 0).unwrap());

        assert_eq!(
            DateTime::try_from(dt).unwrap(),
            DateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        );
    }
}
