//! API endpoint implementations for the coordinator HTTP surface.

pub mod orders;
