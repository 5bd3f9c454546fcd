//! [`Query`] collection related to the multiple [`Rental`]s.

use common::operations::{By, Select};
use derive_more::From;
use tracerr::Traced;

use crate::{
    domain::Rental,
    infra::{database, Database},
    read::rental::list,
    Query, Service,
};

/// Queries a list of [`Rental`]s matching the [`list::Filter`].
#[derive(Clone, Debug, From, PartialEq)]
pub struct List(pub list::Filter);

impl<Db> Query<List> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Rental>, list::Selector>>,
        Ok = Vec<Rental>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(&self, List(filter): List) -> Result<Self::Ok, Self::Err> {
        let selector = list::Selector {
            filter,
            near_radius: self.config().near_threshold_radius,
        };
        self.database()
            .execute(Select(By::new(selector)))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use std::sync::Mutex;

    use common::operations::{By, Select};
    use tracerr::Traced;

    use crate::{
        domain::{rental, Rental},
        infra::{database, Database},
        read::rental::list::{Filter, Selector},
        Config, Query as _, Service,
    };

    use super::List;

    /// [`Database`] remembering the last [`Selector`] it was queried with.
    #[derive(Debug, Default)]
    struct Recording(Mutex<Option<Selector>>);

    impl Database<Select<By<Vec<Rental>, Selector>>> for Recording {
        type Ok = Vec<Rental>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Vec<Rental>, Selector>>,
        ) -> Result<Self::Ok, Self::Err> {
            *self.0.lock().unwrap() = Some(by.into_inner());
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn resolves_configured_radius() {
        let service = Service::new(
            Config {
                near_threshold_radius: 2.5,
            },
            Recording::default(),
        );
        let filter = Filter {
            near: rental::Coordinates::new(10.0, 20.0),
            ..Filter::default()
        };

        let rentals = service.execute(List(filter.clone())).await.unwrap();

        assert!(rentals.is_empty());
        assert_eq!(
            service.database().0.lock().unwrap().take(),
            Some(Selector {
                filter,
                near_radius: 2.5,
            }),
        );
    }
}
