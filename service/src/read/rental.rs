//! [`Rental`]-related read definitions.

#[cfg(doc)]
use crate::domain::Rental;

pub mod list {
    //! [`Rental`] list definitions.

    use std::str::FromStr;

    use common::Pagination;
    use derive_more::{Display, Error};
    use strum::{AsRefStr, VariantArray};

    use crate::domain::rental;
    #[cfg(doc)]
    use crate::domain::Rental;

    /// Criteria narrowing down a [`Rental`] list.
    ///
    /// Every criterion is optional. [`Filter::default()`] selects every
    /// [`Rental`] in the default order.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Filter {
        /// [`rental::Id`]s to select. Empty means any.
        pub ids: Vec<rental::Id>,

        /// Inclusive bounds of [`Rental::price_per_day`].
        pub price: PriceRange,

        /// Point which selected [`Rental`]s should be located near to.
        pub near: Option<rental::Coordinates>,

        /// [`SortField`] to order the list by.
        pub sort: Option<SortField>,

        /// Window of the list to return.
        pub pagination: Pagination,
    }

    /// Inclusive range of [`rental::Price`]s.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct PriceRange {
        /// Lowest admitted [`rental::Price`], if any.
        pub min: Option<rental::Price>,

        /// Highest admitted [`rental::Price`], if any.
        pub max: Option<rental::Price>,
    }

    /// Field a [`Rental`] list may be ordered by.
    #[derive(
        AsRefStr,
        Clone,
        Copy,
        Debug,
        Display,
        Eq,
        Hash,
        PartialEq,
        VariantArray,
    )]
    #[strum(serialize_all = "snake_case")]
    pub enum SortField {
        /// [`Rental::id`].
        Id,

        /// [`Rental::name`].
        Name,

        /// [`Rental::kind`].
        #[strum(serialize = "type")]
        Kind,

        /// [`rental::Vehicle::make`].
        Make,

        /// [`rental::Vehicle::model`].
        Model,

        /// [`rental::Vehicle::year`].
        Year,

        /// [`rental::Vehicle::length`].
        Length,

        /// [`Rental::sleeps`].
        Sleeps,

        /// [`Rental::price_per_day`].
        PricePerDay,
    }

    impl FromStr for SortField {
        type Err = UnknownSortField;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::VARIANTS
                .iter()
                .find(|f| f.as_ref() == s)
                .copied()
                .ok_or_else(|| UnknownSortField(s.to_owned()))
        }
    }

    /// Error of parsing a [`SortField`] not being in the allowed list.
    #[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
    #[display("unknown sort field: `{_0}`")]
    pub struct UnknownSortField(#[error(not(source))] pub String);

    /// [`Filter`] resolved against the [`Service`] configuration.
    ///
    /// [`Service`]: crate::Service
    #[derive(Clone, Debug, PartialEq)]
    pub struct Selector {
        /// [`Filter`] to apply.
        pub filter: Filter,

        /// Radius around [`Filter::near`] which admits a [`Rental`].
        pub near_radius: f64,
    }

    #[cfg(test)]
    mod spec {
        use strum::VariantArray as _;

        use super::{SortField, UnknownSortField};

        #[test]
        fn parses_every_allowed_field() {
            for (s, expected) in [
                ("id", SortField::Id),
                ("name", SortField::Name),
                ("type", SortField::Kind),
                ("make", SortField::Make),
                ("model", SortField::Model),
                ("year", SortField::Year),
                ("length", SortField::Length),
                ("sleeps", SortField::Sleeps),
                ("price_per_day", SortField::PricePerDay),
            ] {
                assert_eq!(s.parse::<SortField>(), Ok(expected), "{s}");
            }
            assert_eq!(SortField::VARIANTS.len(), 9);
        }

        #[test]
        fn displays_as_parsed() {
            for f in SortField::VARIANTS {
                assert_eq!(f.to_string().parse::<SortField>(), Ok(*f));
            }
        }

        #[test]
        fn rejects_unknown_fields() {
            for s in [
                "",
                "kind",
                "Price_Per_Day",
                "vehicle_make",
                "price_per_day; DROP TABLE rentals",
            ] {
                assert_eq!(
                    s.parse::<SortField>(),
                    Err(UnknownSortField(s.into())),
                    "{s}",
                );
            }
        }
    }
}
