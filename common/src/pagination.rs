//! Offset-based pagination.

/// Window of a list to return, expressed as `LIMIT`/`OFFSET`.
///
/// Both bounds are optional: the [`Default`] value returns the whole list.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Pagination {
    /// Maximum number of items to return, if limited.
    pub limit: Option<u32>,

    /// Number of items to skip, if any.
    pub offset: Option<u32>,
}

impl Pagination {
    /// Creates a new [`Pagination`] with the provided bounds.
    #[must_use]
    pub const fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self { limit, offset }
    }
}
