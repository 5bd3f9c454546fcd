//! [`Query`] collection related to a single [`Rental`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{rental, Rental},
    infra::{database, Database},
    Query, Service,
};

/// Queries a [`Rental`] by its [`rental::Id`].
#[derive(Clone, Copy, Debug, Eq, From, PartialEq)]
pub struct ById(pub rental::Id);

impl<Db> Query<ById> for Service<Db>
where
    Db: Database<
        Select<By<Option<Rental>, rental::Id>>,
        Ok = Option<Rental>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Rental;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, ById(id): ById) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        self.database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotExists(id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`ById`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Rental`] doesn't exist.
    #[display("`Rental(id: {_0})` does not exist")]
    #[from(ignore)]
    NotExists(#[error(not(source))] rental::Id),
}
