//! [`Rental`]-related [`Database`] implementations.

use common::operations::{By, Select};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{rental, Rental},
    infra::{
        database::{
            self,
            postgres::{
                self,
                schema::{self, Column, Table},
                Connection, Fragment, QueryBuilder,
            },
            Postgres,
        },
        Database,
    },
    read::rental::list,
};

/// Alias of the subquery narrowing [`Rental`]s down to a bounding box.
const SUBQUERY: &str = "subquery";

impl<C> Database<Select<By<Option<Rental>, rental::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rental>, rental::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let query = plan_by_id(by.into_inner()).render();

        self.query_opt(&query)
            .await
            .map_err(tracerr::wrap!())?
            .map(schema::decode)
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl<C> Database<Select<By<Vec<Rental>, list::Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rental>, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let query = plan_list(by.inner()).render();

        self.query(&query)
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(schema::decode)
            .collect::<Result<_, _>>()
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

/// Selects every [`Column`] of [`Rental`]s joined with their owners.
fn base() -> QueryBuilder {
    QueryBuilder::new()
        .select()
        .columns(Column::ALL.map(Column::select))
        .from(Table::Rentals.name())
        .join(["users ON users.id = rentals.user_id"])
}

/// Plans the query selecting a single [`Rental`] by its [`rental::Id`].
fn plan_by_id(id: rental::Id) -> QueryBuilder {
    base()
        .and_where(
            Fragment::raw(format!("{} = ", Column::Id.qualified()))
                .bind(i32::from(id)),
        )
        .limit(1)
}

/// Plans the query selecting [`Rental`]s matching the provided
/// [`list::Selector`].
///
/// Proximity is checked in two stages: the inner query narrows [`Rental`]s
/// down to a square around the point, and the outer one cuts the circle out
/// of it.
fn plan_list(selector: &list::Selector) -> QueryBuilder {
    let list::Selector {
        filter,
        near_radius,
    } = selector;
    let radius = *near_radius;

    let mut query = base();
    if !filter.ids.is_empty() {
        let ids = filter
            .ids
            .iter()
            .unique()
            .map(|id| Fragment::param(i32::from(*id)));
        query = query.and_where(
            Fragment::raw(format!("{} IN (", Column::Id.qualified()))
                .append(Fragment::join(ids, ", "))
                .text(")"),
        );
    }
    if let Some(min) = filter.price.min {
        query = query.and_where(
            Fragment::raw(format!("{} >= ", Column::PricePerDay.qualified()))
                .bind(i64::from(min)),
        );
    }
    if let Some(max) = filter.price.max {
        query = query.and_where(
            Fragment::raw(format!("{} <= ", Column::PricePerDay.qualified()))
                .bind(i64::from(max)),
        );
    }

    let mut qualifier = None;
    if let Some(near) = filter.near {
        let lat =
            Fragment::raw(format!("ABS({} - ", Column::Latitude.qualified()))
                .bind(near.latitude)
                .text(")");
        let lng =
            Fragment::raw(format!("ABS({} - ", Column::Longitude.qualified()))
                .bind(near.longitude)
                .text(")");
        let inner = query
            .columns([lat.clone().text(" AS a"), lng.clone().text(" AS b")])
            .and_where(lat.text(" <= ").bind(radius))
            .and_where(lng.text(" <= ").bind(radius));

        query = QueryBuilder::new()
            .select()
            .columns(Column::ALL.map(|c| c.reselect(SUBQUERY)))
            .from_subquery(inner, SUBQUERY)
            .and_where(
                Fragment::raw(format!(
                    "SQRT({SUBQUERY}.a * {SUBQUERY}.a + \
                          {SUBQUERY}.b * {SUBQUERY}.b) <= ",
                ))
                .bind(radius),
            );
        qualifier = Some(SUBQUERY);
    }

    if let Some(field) = filter.sort {
        let column = Column::from(field);
        query = query.order_by(
            qualifier
                .map_or_else(|| column.qualified(), |q| column.reselect(q)),
        );
    }
    if let Some(limit) = filter.pagination.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = filter.pagination.offset {
        query = query.offset(offset);
    }
    query
}

#[cfg(test)]
mod spec {
    use std::sync::Mutex;

    use common::{
        operations::{By, Select},
        Pagination,
    };
    use tracerr::Traced;

    use crate::{
        domain::rental,
        infra::{
            database::{
                self,
                postgres::{
                    self, schema::spec::record, Connection, Param, Postgres,
                    Query, Record,
                },
            },
            Database as _,
        },
        read::rental::list::{Filter, PriceRange, Selector, SortField},
    };

    /// Shape of the columns selected by every [`Rental`] query.
    ///
    /// [`Rental`]: crate::domain::Rental
    const COLUMNS: &str = "rentals.id, rentals.user_id, rentals.name, \
        rentals.type, rentals.description, rentals.sleeps, \
        rentals.price_per_day, rentals.home_city, rentals.home_state, \
        rentals.home_zip, rentals.home_country, rentals.vehicle_make, \
        rentals.vehicle_model, rentals.vehicle_year, rentals.vehicle_length, \
        rentals.lat, rentals.lng, rentals.primary_image_url, \
        rentals.created, rentals.updated, \
        users.id AS users_id, users.first_name, users.last_name";

    /// [`Connection`] recording executed [`Query`]s and returning canned
    /// [`Record`]s.
    #[derive(Debug, Default)]
    struct MockConnection {
        queries: Mutex<Vec<Query>>,
        records: Vec<Record>,
    }

    impl MockConnection {
        fn returning(records: impl IntoIterator<Item = Record>) -> Self {
            Self {
                queries: Mutex::default(),
                records: records.into_iter().collect(),
            }
        }

        fn queries(&self) -> Vec<Query> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl Connection for MockConnection {
        async fn query(
            &self,
            query: &Query,
        ) -> Result<Vec<Record>, Traced<database::Error>> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(self.records.clone())
        }

        async fn query_opt(
            &self,
            query: &Query,
        ) -> Result<Option<Record>, Traced<database::Error>> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(self.records.first().cloned())
        }
    }

    fn selector(filter: Filter) -> Selector {
        Selector {
            filter,
            near_radius: 100.0,
        }
    }

    async fn list(filter: Filter) -> Query {
        let db = Postgres(MockConnection::default());
        let rentals: Vec<rental::Rental> = db
            .execute(Select(By::new(selector(filter))))
            .await
            .unwrap();
        assert!(rentals.is_empty());

        let mut queries = db.queries();
        assert_eq!(queries.len(), 1, "exactly one query is executed");
        queries.remove(0)
    }

    #[tokio::test]
    async fn selects_by_id() {
        let db = Postgres(MockConnection::returning([record(7, 1500)]));

        let found: Option<rental::Rental> = db
            .execute(Select(By::new(rental::Id::from(7))))
            .await
            .unwrap();

        assert_eq!(found.map(|r| r.id), Some(rental::Id::from(7)));
        let queries = db.queries();
        assert_eq!(
            queries[0].sql(),
            format!(
                "SELECT {COLUMNS} FROM rentals \
                 JOIN users ON users.id = rentals.user_id \
                 WHERE rentals.id = $1::INT4 LIMIT $2::INT8",
            ),
        );
        assert_eq!(queries[0].params(), [Param::Int4(7), Param::Int8(1)]);
    }

    #[tokio::test]
    async fn selects_nothing_by_missing_id() {
        let db = Postgres(MockConnection::default());

        let found: Option<rental::Rental> = db
            .execute(Select(By::new(rental::Id::from(77))))
            .await
            .unwrap();

        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn selects_everything_with_empty_filter() {
        let query = list(Filter::default()).await;

        assert_eq!(
            query.sql(),
            format!(
                "SELECT {COLUMNS} FROM rentals \
                 JOIN users ON users.id = rentals.user_id",
            ),
        );
        assert!(query.params().is_empty());
    }

    #[tokio::test]
    async fn selects_by_distinct_ids_in_order() {
        let query = list(Filter {
            ids: [3, 1, 3, 2, 1].map(rental::Id::from).into(),
            ..Filter::default()
        })
        .await;

        assert!(query.sql().ends_with(
            " WHERE rentals.id IN ($1::INT4, $2::INT4, $3::INT4)",
        ));
        assert_eq!(query.sql().matches(" IN (").count(), 1);
        assert_eq!(
            query.params(),
            [Param::Int4(3), Param::Int4(1), Param::Int4(2)],
        );
    }

    #[tokio::test]
    async fn selects_by_price_range() {
        let query = list(Filter {
            price: PriceRange {
                min: Some(rental::Price::from(1500)),
                max: Some(rental::Price::from(2000)),
            },
            ..Filter::default()
        })
        .await;

        assert!(query.sql().ends_with(
            " WHERE rentals.price_per_day >= $1::INT8 \
               AND rentals.price_per_day <= $2::INT8",
        ));
        assert_eq!(query.params(), [Param::Int8(1500), Param::Int8(2000)]);
    }

    #[tokio::test]
    async fn selects_by_single_price_bound() {
        let query = list(Filter {
            price: PriceRange {
                min: None,
                max: Some(rental::Price::from(2000)),
            },
            ..Filter::default()
        })
        .await;

        assert!(query
            .sql()
            .ends_with(" WHERE rentals.price_per_day <= $1::INT8"));
        assert!(!query.sql().contains(">="));
        assert_eq!(query.params(), [Param::Int8(2000)]);
    }

    #[tokio::test]
    async fn combines_ids_and_prices() {
        let query = list(Filter {
            ids: vec![rental::Id::from(1)],
            price: PriceRange {
                min: Some(rental::Price::from(10)),
                max: None,
            },
            ..Filter::default()
        })
        .await;

        assert!(query.sql().ends_with(
            " WHERE rentals.id IN ($1::INT4) \
               AND rentals.price_per_day >= $2::INT8",
        ));
    }

    #[tokio::test]
    async fn selects_near_point_in_two_stages() {
        let query = list(Filter {
            near: rental::Coordinates::new(33.64, -117.93),
            ..Filter::default()
        })
        .await;

        let reselected = COLUMNS
            .replace("rentals.", "subquery.")
            .replace("users.id AS users_id", "subquery.users_id")
            .replace("users.", "subquery.");
        assert_eq!(
            query.sql(),
            format!(
                "SELECT {reselected} FROM (\
                    SELECT {COLUMNS}, \
                           ABS(rentals.lat - $1::FLOAT8) AS a, \
                           ABS(rentals.lng - $2::FLOAT8) AS b \
                    FROM rentals JOIN users ON users.id = rentals.user_id \
                    WHERE ABS(rentals.lat - $3::FLOAT8) <= $4::FLOAT8 \
                      AND ABS(rentals.lng - $5::FLOAT8) <= $6::FLOAT8\
                 ) subquery \
                 WHERE SQRT(subquery.a * subquery.a + \
                            subquery.b * subquery.b) <= $7::FLOAT8",
            ),
        );
        assert_eq!(
            query.params(),
            [
                Param::Float8(33.64),
                Param::Float8(-117.93),
                Param::Float8(33.64),
                Param::Float8(100.0),
                Param::Float8(-117.93),
                Param::Float8(100.0),
                Param::Float8(100.0),
            ],
        );
    }

    #[tokio::test]
    async fn orders_and_paginates_outermost_query() {
        let query = list(Filter {
            ids: vec![rental::Id::from(5)],
            near: rental::Coordinates::new(1.0, 2.0),
            sort: Some(SortField::Make),
            pagination: Pagination::new(Some(10), Some(20)),
            ..Filter::default()
        })
        .await;

        assert!(query.sql().ends_with(
            ") subquery \
             WHERE SQRT(subquery.a * subquery.a + \
                        subquery.b * subquery.b) <= $8::FLOAT8 \
             ORDER BY subquery.vehicle_make LIMIT $9::INT8 OFFSET $10::INT8",
        ));
        assert_eq!(query.sql().matches("ORDER BY").count(), 1);
        assert_eq!(query.sql().matches("LIMIT").count(), 1);
        assert_eq!(query.params()[0], Param::Int4(5));
        assert_eq!(query.params()[8..], [Param::Int8(10), Param::Int8(20)]);
    }

    #[tokio::test]
    async fn orders_by_physical_column() {
        let query = list(Filter {
            sort: Some(SortField::Kind),
            pagination: Pagination::new(Some(5), None),
            ..Filter::default()
        })
        .await;

        assert!(query
            .sql()
            .ends_with(" ORDER BY rentals.type LIMIT $1::INT8"));
        assert_eq!(query.params(), [Param::Int8(5)]);
    }

    #[tokio::test]
    async fn maps_returned_records() {
        let db = Postgres(MockConnection::returning([
            record(1, 1500),
            record(2, 2000),
        ]));

        let rentals: Vec<rental::Rental> = db
            .execute(Select(By::new(selector(Filter::default()))))
            .await
            .unwrap();

        assert_eq!(
            rentals.iter().map(|r| r.id).collect::<Vec<_>>(),
            [rental::Id::from(1), rental::Id::from(2)],
        );
        assert_eq!(rentals[1].price_per_day, rental::Price::from(2000));
    }

    #[tokio::test]
    async fn fails_on_malformed_record() {
        let db = Postgres(MockConnection::returning([Record::default()]));

        let res: Result<Vec<rental::Rental>, _> = db
            .execute(Select(By::new(selector(Filter::default()))))
            .await;

        let err = res.unwrap_err();
        let err: &database::Error = err.as_ref();
        assert!(matches!(
            err,
            database::Error::Postgres(postgres::Error::Scan(_)),
        ));
    }
}
