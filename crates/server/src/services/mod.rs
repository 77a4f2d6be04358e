//! Business services layered over the repositories.

pub mod auth;
pub mod catalog;
pub mod payment;
