pub mod compose;
pub mod config;
pub mod consts;
pub mod design;
pub mod error;
pub mod geometry;
pub mod pricing;
pub mod schedule;
pub mod session;
pub mod source;
pub mod transform;
pub mod validate;
