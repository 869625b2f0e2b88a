#![allow(clippy::module_inception)]
pub mod middleware;

pub use middleware::{Middleware, compose};
