//! Builder inmutable de chains.

pub mod builder;

pub use builder::Job;
