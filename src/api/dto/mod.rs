//! Data Transfer Objects for REST request/response serialization.

pub mod auth_dto;
pub mod response_dto;
pub mod station_dto;

pub use auth_dto::*;
pub use response_dto::*;
pub use station_dto::*;
