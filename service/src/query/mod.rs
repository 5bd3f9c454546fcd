//! [`Query`] definition.

pub mod rental;
pub mod rentals;

/// [`Query`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Query;
