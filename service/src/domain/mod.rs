//! Domain definitions.

pub mod rental;
pub mod user;

pub use self::{rental::Rental, user::User};
