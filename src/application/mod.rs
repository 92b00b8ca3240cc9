//! Application services layer.

pub mod error;
pub mod floors;
pub mod query;
pub mod repos;
