pub mod hash;
pub mod signature;
pub mod derivation;

pub use hash::*;
pub use signature::*;
pub use derivation::*;
