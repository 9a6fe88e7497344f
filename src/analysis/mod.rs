//! Analysis results, memoization and the cached service layer

pub mod cache;
pub mod result;
pub mod service;
