pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod normalize;
pub mod observability;
pub mod repository;
pub mod routing;
pub mod state;
pub mod zones;
