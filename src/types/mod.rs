pub mod errors;
pub mod identity;
pub mod ids;

pub use errors::*;
pub use identity::*;
pub use ids::*;
