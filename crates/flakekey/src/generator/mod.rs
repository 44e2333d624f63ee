mod lock;
mod mutex;
mod process;
mod status;
mod waiter;

pub use lock::*;
pub use process::*;
pub use status::*;
