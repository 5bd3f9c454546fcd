//! Columns of the [`Rental`] relation and their mapping.
//!
//! [`Column::ALL`] is the single source of truth for both the `SELECT` list
//! of every [`Rental`] query and the positional decoding of its rows.

use common::DateTime;
use rust_decimal::prelude::ToPrimitive as _;

use crate::{
    domain::{rental, user, Rental, User},
    read::rental::list::SortField,
};

use super::record::{Record, ScanError, Value, ValueType};

/// Table a [`Column`] belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Table {
    /// `rentals` table.
    Rentals,

    /// `users` table.
    Users,
}

impl Table {
    /// Returns the SQL name of this [`Table`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rentals => "rentals",
            Self::Users => "users",
        }
    }
}

/// Column selected for a [`Rental`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Column {
    /// `rentals.id`.
    Id,
    /// `rentals.user_id`.
    UserId,
    /// `rentals.name`.
    Name,
    /// `rentals.type`.
    Kind,
    /// `rentals.description`.
    Description,
    /// `rentals.sleeps`.
    Sleeps,
    /// `rentals.price_per_day`.
    PricePerDay,
    /// `rentals.home_city`.
    HomeCity,
    /// `rentals.home_state`.
    HomeState,
    /// `rentals.home_zip`.
    HomeZip,
    /// `rentals.home_country`.
    HomeCountry,
    /// `rentals.vehicle_make`.
    VehicleMake,
    /// `rentals.vehicle_model`.
    VehicleModel,
    /// `rentals.vehicle_year`.
    VehicleYear,
    /// `rentals.vehicle_length`.
    VehicleLength,
    /// `rentals.lat`.
    Latitude,
    /// `rentals.lng`.
    Longitude,
    /// `rentals.primary_image_url`.
    PrimaryImageUrl,
    /// `rentals.created`.
    Created,
    /// `rentals.updated`.
    Updated,
    /// `users.id`, selected as `users_id`.
    OwnerId,
    /// `users.first_name`.
    OwnerFirstName,
    /// `users.last_name`.
    OwnerLastName,
}

impl Column {
    /// All the [`Column`]s in their selection order.
    pub const ALL: [Self; 23] = [
        Self::Id,
        Self::UserId,
        Self::Name,
        Self::Kind,
        Self::Description,
        Self::Sleeps,
        Self::PricePerDay,
        Self::HomeCity,
        Self::HomeState,
        Self::HomeZip,
        Self::HomeCountry,
        Self::VehicleMake,
        Self::VehicleModel,
        Self::VehicleYear,
        Self::VehicleLength,
        Self::Latitude,
        Self::Longitude,
        Self::PrimaryImageUrl,
        Self::Created,
        Self::Updated,
        Self::OwnerId,
        Self::OwnerFirstName,
        Self::OwnerLastName,
    ];

    /// Returns the position of this [`Column`] in [`Column::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the [`Table`] this [`Column`] belongs to.
    #[must_use]
    pub const fn table(self) -> Table {
        match self {
            Self::OwnerId | Self::OwnerFirstName | Self::OwnerLastName => {
                Table::Users
            }
            Self::Id
            | Self::UserId
            | Self::Name
            | Self::Kind
            | Self::Description
            | Self::Sleeps
            | Self::PricePerDay
            | Self::HomeCity
            | Self::HomeState
            | Self::HomeZip
            | Self::HomeCountry
            | Self::VehicleMake
            | Self::VehicleModel
            | Self::VehicleYear
            | Self::VehicleLength
            | Self::Latitude
            | Self::Longitude
            | Self::PrimaryImageUrl
            | Self::Created
            | Self::Updated => Table::Rentals,
        }
    }

    /// Returns the SQL name of this [`Column`] in its [`Table`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id | Self::OwnerId => "id",
            Self::UserId => "user_id",
            Self::Name => "name",
            Self::Kind => "type",
            Self::Description => "description",
            Self::Sleeps => "sleeps",
            Self::PricePerDay => "price_per_day",
            Self::HomeCity => "home_city",
            Self::HomeState => "home_state",
            Self::HomeZip => "home_zip",
            Self::HomeCountry => "home_country",
            Self::VehicleMake => "vehicle_make",
            Self::VehicleModel => "vehicle_model",
            Self::VehicleYear => "vehicle_year",
            Self::VehicleLength => "vehicle_length",
            Self::Latitude => "lat",
            Self::Longitude => "lng",
            Self::PrimaryImageUrl => "primary_image_url",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::OwnerFirstName => "first_name",
            Self::OwnerLastName => "last_name",
        }
    }

    /// Returns the name this [`Column`] has in the result set.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        if matches!(self, Self::OwnerId) {
            "users_id"
        } else {
            self.name()
        }
    }

    /// Returns the [`ValueType`] declared for this [`Column`].
    #[must_use]
    pub const fn ty(self) -> ValueType {
        match self {
            Self::Id
            | Self::UserId
            | Self::Sleeps
            | Self::VehicleYear
            | Self::OwnerId => ValueType::Int4,
            Self::PricePerDay => ValueType::Int8,
            Self::VehicleLength | Self::Latitude | Self::Longitude => {
                ValueType::Float8
            }
            Self::Created | Self::Updated => ValueType::Timestamp,
            Self::Name
            | Self::Kind
            | Self::Description
            | Self::HomeCity
            | Self::HomeState
            | Self::HomeZip
            | Self::HomeCountry
            | Self::VehicleMake
            | Self::VehicleModel
            | Self::PrimaryImageUrl
            | Self::OwnerFirstName
            | Self::OwnerLastName => ValueType::Text,
        }
    }

    /// Returns the table-qualified name of this [`Column`].
    #[must_use]
    pub fn qualified(self) -> String {
        format!("{}.{}", self.table().name(), self.name())
    }

    /// Returns the expression selecting this [`Column`] from its [`Table`].
    #[must_use]
    pub fn select(self) -> String {
        if self.alias() == self.name() {
            self.qualified()
        } else {
            format!("{} AS {}", self.qualified(), self.alias())
        }
    }

    /// Returns the expression selecting this [`Column`] from the subquery
    /// under the provided `alias`.
    #[must_use]
    pub fn reselect(self, alias: &str) -> String {
        format!("{alias}.{}", self.alias())
    }

    /// Checks whether the provided [`ValueType`] may be stored into this
    /// [`Column`] without loss.
    fn admits(self, actual: ValueType) -> bool {
        let expected = self.ty();
        actual == expected
            || matches!(
                (expected, actual),
                (ValueType::Float8, ValueType::Numeric)
                    | (ValueType::Int8, ValueType::Int4)
            )
    }
}

impl From<SortField> for Column {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Id => Self::Id,
            SortField::Name => Self::Name,
            SortField::Kind => Self::Kind,
            SortField::Make => Self::VehicleMake,
            SortField::Model => Self::VehicleModel,
            SortField::Year => Self::VehicleYear,
            SortField::Length => Self::VehicleLength,
            SortField::Sleeps => Self::Sleeps,
            SortField::PricePerDay => Self::PricePerDay,
        }
    }
}

/// Maps the provided [`Record`] selected by [`Column::ALL`] into a [`Rental`].
///
/// # Errors
///
/// If the [`Record`] doesn't match [`Column::ALL`] in length, or any of its
/// [`Value`]s doesn't match the type of its [`Column`].
pub fn decode(record: Record) -> Result<Rental, ScanError> {
    if record.len() != Column::ALL.len() {
        return Err(ScanError::ColumnCount {
            expected: Column::ALL.len(),
            actual: record.len(),
        });
    }
    for (col, value) in Column::ALL.into_iter().zip(record.values()) {
        if !col.admits(value.ty()) {
            return Err(ScanError::TypeMismatch {
                column: col.alias(),
                expected: col.ty(),
                actual: value.ty(),
            });
        }
    }

    let mut values = Fields(record.into_values());
    let id = rental::Id::from(values.int4(Column::Id));
    let user_id = user::Id::from(values.int4(Column::UserId));
    Ok(Rental {
        id,
        user_id,
        name: values.text(Column::Name),
        kind: values.text(Column::Kind),
        description: values.text(Column::Description),
        sleeps: values.int4(Column::Sleeps),
        price_per_day: rental::Price::from(values.int8(Column::PricePerDay)),
        home: rental::Home {
            city: values.text(Column::HomeCity),
            state: values.text(Column::HomeState),
            zip: values.text(Column::HomeZip),
            country: values.text(Column::HomeCountry),
            coordinates: rental::Coordinates {
                latitude: values.float8(Column::Latitude),
                longitude: values.float8(Column::Longitude),
            },
        },
        vehicle: rental::Vehicle {
            make: values.text(Column::VehicleMake),
            model: values.text(Column::VehicleModel),
            year: values.int4(Column::VehicleYear),
            length: values.float8(Column::VehicleLength),
        },
        primary_image_url: values.text(Column::PrimaryImageUrl),
        created_at: values.timestamp(Column::Created).coerce(),
        updated_at: values.timestamp(Column::Updated).coerce(),
        user: User {
            id: user::Id::from(values.int4(Column::OwnerId)),
            first_name: values.text(Column::OwnerFirstName),
            last_name: values.text(Column::OwnerLastName),
        },
    })
}

/// [`Value`]s of a [`Record`] already checked against [`Column::ALL`].
///
/// Every [`Value`] is non-`NULL` and of its [`Column`] type, so the zero value
/// fallbacks of the accessors are never reached.
struct Fields(Vec<Value>);

impl Fields {
    /// Takes the [`Value`] of the provided [`Column`] out.
    fn take(&mut self, col: Column) -> Value {
        std::mem::replace(&mut self.0[col.index()], Value::Null)
    }

    /// Takes the `INT4` [`Value`] of the provided [`Column`].
    fn int4(&mut self, col: Column) -> i32 {
        if let Value::Int4(v) = self.take(col) {
            v
        } else {
            0
        }
    }

    /// Takes the `INT8` [`Value`] of the provided [`Column`].
    fn int8(&mut self, col: Column) -> i64 {
        let value = self.take(col);
        if let Value::Int8(v) = value {
            v
        } else if let Value::Int4(v) = value {
            v.into()
        } else {
            0
        }
    }

    /// Takes the `FLOAT8` [`Value`] of the provided [`Column`].
    fn float8(&mut self, col: Column) -> f64 {
        let value = self.take(col);
        if let Value::Float8(v) = value {
            v
        } else if let Value::Numeric(v) = value {
            v.to_f64().unwrap_or_default()
        } else {
            0.0
        }
    }

    /// Takes the `TEXT` [`Value`] of the provided [`Column`].
    fn text(&mut self, col: Column) -> String {
        if let Value::Text(v) = self.take(col) {
            v
        } else {
            String::new()
        }
    }

    /// Takes the `TIMESTAMP` [`Value`] of the provided [`Column`].
    fn timestamp(&mut self, col: Column) -> DateTime {
        if let Value::Timestamp(v) = self.take(col) {
            v
        } else {
            DateTime::UNIX_EPOCH
        }
    }
}
