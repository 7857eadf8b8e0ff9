//! Request / response DTOs for the JSON API.

pub mod auth;
pub mod conversations;
pub mod messages;
