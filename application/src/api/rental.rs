//! [`Rental`]-related definitions.

use axum::{
    extract::{rejection::PathRejection, Path},
    Extension, Json,
};
use common::Handler as _;
use serde::Serialize;
use service::{domain, query};

use crate::{api, define_error, AsError, Error, Service};

/// Vehicle listed for rent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rental {
    /// ID of this [`Rental`].
    pub id: domain::rental::Id,

    /// Name of this [`Rental`].
    pub name: String,

    /// Description of this [`Rental`].
    pub description: String,

    /// Kind of this [`Rental`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Make of the vehicle.
    pub make: String,

    /// Model of the vehicle.
    pub model: String,

    /// Model year of the vehicle.
    pub year: i32,

    /// Length of the vehicle in feet.
    pub length: f64,

    /// Number of people this [`Rental`] sleeps.
    pub sleeps: i32,

    /// URL of the primary image of this [`Rental`].
    pub primary_image_url: String,

    /// [`Price`] of this [`Rental`].
    pub price: Price,

    /// [`Location`] of this [`Rental`].
    pub location: Location,

    /// [`User`] owning this [`Rental`].
    pub user: User,

    /// When this [`Rental`] was created.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: domain::rental::CreationDateTime,

    /// When this [`Rental`] was updated last time.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: domain::rental::UpdateDateTime,
}

/// Price of a [`Rental`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Price {
    /// Price for a single day in cents.
    pub day: domain::rental::Price,
}

/// Location of a [`Rental`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Location {
    /// City.
    pub city: String,

    /// State.
    pub state: String,

    /// Zip code.
    pub zip: String,

    /// Country.
    pub country: String,

    /// Latitude.
    pub lat: f64,

    /// Longitude.
    pub lng: f64,
}

/// Owner of a [`Rental`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct User {
    /// ID of this [`User`].
    pub id: domain::user::Id,

    /// First name of this [`User`].
    pub first_name: String,

    /// Last name of this [`User`].
    pub last_name: String,
}

impl From<domain::Rental> for Rental {
    fn from(rental: domain::Rental) -> Self {
        let domain::Rental {
            id,
            user_id: _,
            name,
            kind,
            description,
            sleeps,
            price_per_day,
            home,
            vehicle,
            primary_image_url,
            created_at,
            updated_at,
            user,
        } = rental;

        Self {
            id,
            name,
            description,
            kind,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            length: vehicle.length,
            sleeps,
            primary_image_url,
            price: Price { day: price_per_day },
            location: Location {
                city: home.city,
                state: home.state,
                zip: home.zip,
                country: home.country,
                lat: home.coordinates.latitude,
                lng: home.coordinates.longitude,
            },
            user: User {
                id: user.id,
                first_name: user.first_name,
                last_name: user.last_name,
            },
            created_at,
            updated_at,
        }
    }
}

/// Returns a single [`Rental`] by its ID.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_ARGUMENT` - provided ID is not a number;
/// - `RENTAL_NOT_EXISTS` - [`Rental`] with the provided ID doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.route = "/rentals/:id", rental.id = tracing::field::Empty),
)]
pub async fn get(
    Extension(service): Extension<Service>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Rental>, Error> {
    let Path(id) = id.map_err(|e| {
        tracing::debug!("malformed `Rental` ID: {e}");
        Error::invalid_argument(vec![api::invalid_parameter("id")])
    })?;
    _ = tracing::Span::current().record("rental.id", id);

    service
        .execute(query::rental::ById(id.into()))
        .await
        .map(|r| Json(r.into()))
        .map_err(AsError::into_error)
}

impl AsError for query::rental::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "RENTAL_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Rental` does not exist"]
                NotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotExists(_) => Some(Error::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use serde_json::json;
    use service::{
        domain::{self, rental, user},
        infra::{database, postgres},
        query,
    };

    use crate::AsError as _;

    use super::Rental;

    fn rental() -> domain::Rental {
        let created_at = DateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let updated_at = DateTime::from_unix_timestamp(1_700_086_400).unwrap();
        domain::Rental {
            id: rental::Id::from(2),
            user_id: user::Id::from(1),
            name: "Maupin: Vanagon Camper".to_owned(),
            kind: "camper-van".to_owned(),
            description: "fermentum nullam congue arcu sollicitudin"
                .to_owned(),
            sleeps: 4,
            price_per_day: rental::Price::from(1500),
            home: rental::Home {
                city: "Costa Mesa".to_owned(),
                state: "CA".to_owned(),
                zip: "92627".to_owned(),
                country: "US".to_owned(),
                coordinates: rental::Coordinates::new(33.64, -117.93)
                    .unwrap(),
            },
            vehicle: rental::Vehicle {
                make: "Volkswagen".to_owned(),
                model: "Vanagon Camper".to_owned(),
                year: 1989,
                length: 15.0,
            },
            primary_image_url: "https://example.com/2.png".to_owned(),
            created_at: created_at.coerce(),
            updated_at: updated_at.coerce(),
            user: domain::User {
                id: user::Id::from(1),
                first_name: "John".to_owned(),
                last_name: "Smith".to_owned(),
            },
        }
    }

    #[test]
    fn serializes_flat_vehicle_and_nested_location() {
        let json = serde_json::to_value(Rental::from(rental())).unwrap();

        assert_eq!(
            json,
            json!({
                "id": 2,
                "name": "Maupin: Vanagon Camper",
                "description": "fermentum nullam congue arcu sollicitudin",
                "type": "camper-van",
                "make": "Volkswagen",
                "model": "Vanagon Camper",
                "year": 1989,
                "length": 15.0,
                "sleeps": 4,
                "primary_image_url": "https://example.com/2.png",
                "price": {"day": 1500},
                "location": {
                    "city": "Costa Mesa",
                    "state": "CA",
                    "zip": "92627",
                    "country": "US",
                    "lat": 33.64,
                    "lng": -117.93,
                },
                "user": {
                    "id": 1,
                    "first_name": "John",
                    "last_name": "Smith",
                },
                "created_at": "2023-11-14T22:13:20Z",
                "updated_at": "2023-11-15T22:13:20Z",
            }),
        );
    }

    #[test]
    fn fails_to_serialize_years_before_zero() {
        let bc = DateTime::from_unix_timestamp(-62_200_000_000).unwrap();
        let rental = domain::Rental {
            created_at: bc.coerce(),
            ..rental()
        };

        assert!(serde_json::to_value(Rental::from(rental)).is_err());
    }

    #[test]
    fn maps_missing_rental_to_not_found() {
        let err = query::rental::ExecutionError::NotExists(rental::Id::from(77))
            .into_error();

        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
        assert_eq!(err.code, "RENTAL_NOT_EXISTS");
    }

    #[test]
    fn maps_database_failure_to_internal() {
        let err = query::rental::ExecutionError::Db(database::Error::from(
            postgres::Error::Scan(postgres::record::ScanError::ColumnCount {
                expected: 23,
                actual: 1,
            }),
        ))
        .into_error();

        assert_eq!(err.status_code, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
    }
}
