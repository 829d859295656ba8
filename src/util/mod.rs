//! Useful utilities shared by the query engines

pub mod parallel;
pub mod semiring;
