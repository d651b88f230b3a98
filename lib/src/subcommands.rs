pub use clear::*;
pub use predict::*;
pub use server::*;
pub use train::*;

pub mod clear;
pub mod predict;
pub mod server;
pub mod train;
