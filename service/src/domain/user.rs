//! [`User`] definitions.

use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

/// User owning a listed rental.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// First name of this [`User`].
    pub first_name: String,

    /// Last name of this [`User`].
    pub last_name: String,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(i32);
