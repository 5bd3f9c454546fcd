//! Read entities definitions.

pub mod rental;
