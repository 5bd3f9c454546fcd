//! [`Connection`] definitions.

use std::future::Future;

use tracerr::Traced;
use tracing as log;

use crate::infra::database::{self, postgres};

use super::{Query, Record};

pub use deadpool_postgres::{
    Client as Pooled, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Generic database connection.
pub trait Connection {
    /// Executes the provided [`Query`] and returns the resulting [`Record`]s.
    ///
    /// # Errors
    ///
    /// If failed to execute the [`Query`] or to decode its rows.
    fn query(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<Record>, Traced<database::Error>>>;

    /// Executes the provided [`Query`] and returns the resulting [`Record`],
    /// if any.
    ///
    /// # Errors
    ///
    /// If failed to execute the [`Query`], to decode its row, or the [`Query`]
    /// returned more than one row.
    fn query_opt(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Option<Record>, Traced<database::Error>>>;
}

impl Connection for Pooled {
    async fn query(
        &self,
        query: &Query,
    ) -> Result<Vec<Record>, Traced<database::Error>> {
        log::debug!(sql = %query, params = ?query.params(), "executing query");

        (**self)
            .query(query.sql(), &query.bindings())
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?
            .iter()
            .map(Record::decode)
            .collect::<Result<_, _>>()
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    async fn query_opt(
        &self,
        query: &Query,
    ) -> Result<Option<Record>, Traced<database::Error>> {
        log::debug!(sql = %query, params = ?query.params(), "executing query");

        (**self)
            .query_opt(query.sql(), &query.bindings())
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?
            .as_ref()
            .map(Record::decode)
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}
