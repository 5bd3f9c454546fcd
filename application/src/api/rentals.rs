//! Definitions related to the multiple [`Rental`]s.

use axum::{
    extract::{rejection::QueryRejection, Query},
    Extension, Json,
};
use common::{Handler as _, Pagination};
use serde::Deserialize;
use service::{
    domain::rental,
    query,
    read::rental::list::{Filter, PriceRange, SortField},
};

use crate::{api, api::Rental, AsError, Error, Service};

/// Query string parameters of a [`Rental`]s list request.
///
/// Values are raw strings, so every malformed one is reported at once. Empty
/// values are treated as absent.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    /// Comma-separated [`rental::Id`]s.
    pub ids: Option<String>,

    /// Lowest admitted price per day in cents.
    pub price_min: Option<String>,

    /// Highest admitted price per day in cents.
    pub price_max: Option<String>,

    /// Comma-separated latitude and longitude.
    pub near: Option<String>,

    /// [`SortField`] to order by.
    pub sort: Option<String>,

    /// Maximum number of [`Rental`]s to return.
    pub limit: Option<String>,

    /// Number of [`Rental`]s to skip.
    pub offset: Option<String>,
}

impl ListParams {
    /// Converts these [`ListParams`] into a [`Filter`].
    ///
    /// # Errors
    ///
    /// With a description of every malformed parameter, in declaration order.
    pub fn into_filter(self) -> Result<Filter, Vec<String>> {
        let Self {
            ids,
            price_min,
            price_max,
            near,
            sort,
            limit,
            offset,
        } = self;
        let mut errors = Vec::new();

        let ids = parse(ids, "ids", &mut errors, |s| {
            s.split(',')
                .map(|id| id.trim().parse::<i32>().ok().map(rental::Id::from))
                .collect::<Option<Vec<_>>>()
        });
        let min = parse(price_min, "price_min", &mut errors, |s| {
            s.parse::<i64>().ok().map(rental::Price::from)
        });
        let max = parse(price_max, "price_max", &mut errors, |s| {
            s.parse::<i64>().ok().map(rental::Price::from)
        });
        let near = parse(near, "near", &mut errors, |s| {
            let (lat, lng) = s.split_once(',')?;
            rental::Coordinates::new(
                lat.trim().parse().ok()?,
                lng.trim().parse().ok()?,
            )
        });
        let sort = parse(sort, "sort", &mut errors, |s| {
            s.parse::<SortField>().ok()
        });
        let limit = parse(limit, "limit", &mut errors, |s| s.parse().ok());
        let offset = parse(offset, "offset", &mut errors, |s| s.parse().ok());

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Filter {
            ids: ids.unwrap_or_default(),
            price: PriceRange { min, max },
            near,
            sort,
            pagination: Pagination::new(limit, offset),
        })
    }
}

/// Parses the provided raw parameter `value`, if any.
///
/// Records an error in `errors` if the `value` is present but cannot be
/// parsed.
fn parse<T>(
    value: Option<String>,
    name: &str,
    errors: &mut Vec<String>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let value = value.filter(|v| !v.is_empty())?;
    let parsed = parse(&value);
    if parsed.is_none() {
        errors.push(api::invalid_parameter(name));
    }
    parsed
}

/// Returns a list of [`Rental`]s matching the provided query parameters.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_ARGUMENT` - some query parameters are malformed.
#[tracing::instrument(skip_all, fields(http.route = "/rentals"))]
pub async fn list(
    Extension(service): Extension<Service>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Rental>>, Error> {
    let Query(params) = params.map_err(AsError::into_error)?;
    let filter = params.into_filter().map_err(Error::invalid_argument)?;
    tracing::debug!(?filter, "listing rentals");

    service
        .execute(query::rentals::List(filter))
        .await
        .map(|rentals| Json(rentals.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}
