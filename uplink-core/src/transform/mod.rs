pub mod dataset;
pub mod export;
pub mod stats;
pub mod wav;
