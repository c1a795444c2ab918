//! Cloud environment descriptors

mod cloud;

pub use cloud::{Cloud, Environment};
