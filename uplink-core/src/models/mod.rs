pub mod capture;
pub mod config;
pub mod error;
pub mod record;
pub mod webhook;
