pub mod download;
pub mod local;
pub mod webhook;
