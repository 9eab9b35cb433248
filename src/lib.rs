pub mod auth;
pub mod campaign;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod storage;
