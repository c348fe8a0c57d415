//! Data models

pub mod policy_type;

pub use policy_type::*;
