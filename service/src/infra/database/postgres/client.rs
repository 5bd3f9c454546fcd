//! [`NonTx`] client definitions.

use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection, Query, Record},
};

/// Non-transactional Postgres database client.
///
/// Every [`Query`] is executed on a [`connection::Pooled`] connection taken
/// from the [`connection::Pool`] for the time of the [`Query`] only.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take connections from.
    pub(crate) pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Takes a [`connection::Pooled`] connection from the
    /// [`connection::Pool`].
    async fn connection(
        &self,
    ) -> Result<connection::Pooled, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for NonTx {
    async fn query(
        &self,
        query: &Query,
    ) -> Result<Vec<Record>, Traced<database::Error>> {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query(query)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt(
        &self,
        query: &Query,
    ) -> Result<Option<Record>, Traced<database::Error>> {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(query)
            .await
            .map_err(tracerr::wrap!())
    }
}
