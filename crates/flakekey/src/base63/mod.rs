mod codec;
mod interface;

pub use codec::*;
pub use interface::*;
