//! Credential port, token pair, and redacted secret models.

pub mod memory;
pub mod pair;
pub mod port;
pub mod secret;

pub use memory::*;
pub use pair::TokenPair;
pub use port::*;
pub use secret::*;
