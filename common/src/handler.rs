//! [`Handler`] abstractions.

use std::future::Future;

/// Asynchronous handler of some `Args`.
///
/// Both service queries and database operations are expressed as
/// [`Handler`]s, parametrized by the operation they accept.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Handles the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
