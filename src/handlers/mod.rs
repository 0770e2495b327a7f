pub mod adjustments;
pub mod admin;
pub mod auth;
pub mod ponto;
pub mod reports;
pub mod shared;
