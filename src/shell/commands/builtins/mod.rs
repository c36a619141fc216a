pub mod common; // Private helpers
pub mod env;
pub mod fs;
pub mod remote;
pub mod session;
