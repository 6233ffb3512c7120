pub mod cache;
pub mod case_store;
pub mod config;
pub mod idam;
pub mod logging;
pub mod role_service;
pub mod service_auth;
