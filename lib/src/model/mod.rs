pub mod activation;
pub mod network;
pub mod quantizer;
pub mod trainer;
pub mod types;
pub mod utils;
pub mod weights;

pub use activation::*;
pub use network::*;
pub use quantizer::*;
pub use trainer::*;
pub use types::*;
pub use utils::*;
pub use weights::*;
