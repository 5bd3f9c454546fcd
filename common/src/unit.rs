//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing the last update of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Update;
