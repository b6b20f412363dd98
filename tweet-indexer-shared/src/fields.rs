//! Field names of a normalized tweet record.
//!
//! The same names are used when writing records and when declaring the index schema,
//! so they live here instead of being repeated as literals.

pub const ID: &str = "id";
pub const USER: &str = "user";
pub const TEXT: &str = "text";
pub const SOURCE: &str = "source";
pub const HASHTAGS: &str = "hashtags";
pub const LOCATION: &str = "location";
pub const CREATED: &str = "created";
pub const COORDINATES: &str = "coordinates";

/// Value stored under [`SOURCE`] when the client descriptor cannot be parsed.
pub const UNKNOWN_SOURCE: &str = "unknown";
