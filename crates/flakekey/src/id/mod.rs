mod flake_id;

pub use flake_id::*;
