//! [`Rental`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

use crate::domain::{user, User};

/// Vehicle listed for rent.
#[derive(Clone, Debug, PartialEq)]
pub struct Rental {
    /// ID of this [`Rental`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Rental`].
    pub user_id: user::Id,

    /// Name of this [`Rental`].
    pub name: String,

    /// Kind of this [`Rental`] (`camper-van`, `trailer`, ...).
    pub kind: String,

    /// Free-form description of this [`Rental`].
    pub description: String,

    /// Number of people this [`Rental`] sleeps.
    pub sleeps: i32,

    /// [`Price`] of this [`Rental`] for a single day.
    pub price_per_day: Price,

    /// [`Home`] location of this [`Rental`].
    pub home: Home,

    /// [`Vehicle`] attributes of this [`Rental`].
    pub vehicle: Vehicle,

    /// URL of the primary image of this [`Rental`].
    pub primary_image_url: String,

    /// [`DateTime`] when this [`Rental`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Rental`] was updated last time.
    pub updated_at: UpdateDateTime,

    /// [`User`] owning this [`Rental`].
    pub user: User,
}

/// ID of a [`Rental`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(i32);

/// Price in the smallest currency unit (cents).
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Price(i64);

/// Location a [`Rental`] is picked up at.
#[derive(Clone, Debug, PartialEq)]
pub struct Home {
    /// City of this [`Home`].
    pub city: String,

    /// State of this [`Home`].
    pub state: String,

    /// Zip code of this [`Home`].
    pub zip: String,

    /// Country of this [`Home`].
    pub country: String,

    /// [`Coordinates`] of this [`Home`].
    pub coordinates: Coordinates,
}

/// Attributes of a [`Rental`] vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    /// Make of this [`Vehicle`].
    pub make: String,

    /// Model of this [`Vehicle`].
    pub model: String,

    /// Model year of this [`Vehicle`].
    pub year: i32,

    /// Length of this [`Vehicle`] in feet.
    pub length: f64,
}

/// Point on a map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    /// Latitude in degrees, within `[-90, 90]`.
    pub latitude: f64,

    /// Longitude in degrees, within `[-180, 180]`.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates new [`Coordinates`] if the given values describe a point on a
    /// map.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        Self::check(latitude, longitude).then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Checks whether the given values describe valid [`Coordinates`].
    fn check(latitude: f64, longitude: f64) -> bool {
        (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
    }
}

/// [`DateTime`] when a [`Rental`] was created.
pub type CreationDateTime = DateTimeOf<(Rental, unit::Creation)>;

/// [`DateTime`] when a [`Rental`] was updated.
pub type UpdateDateTime = DateTimeOf<(Rental, unit::Update)>;
