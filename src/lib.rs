pub mod config;
pub mod error;
pub mod geometry;
pub mod measure;
pub mod session;
pub mod sim;
pub mod system;
pub mod tracking;
