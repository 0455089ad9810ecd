pub mod capability;
pub mod fsid;

pub use capability::*;
pub use fsid::*;
