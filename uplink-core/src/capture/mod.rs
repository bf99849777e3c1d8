pub mod bridge;
pub mod source;
