pub mod clean;
pub mod config;
pub mod load;
pub mod pipeline;
pub mod verify;
pub mod write;
