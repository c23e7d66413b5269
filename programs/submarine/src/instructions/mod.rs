pub mod reveal;
pub mod unlock;

pub use reveal::*;
pub use unlock::*;
