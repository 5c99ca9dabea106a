pub mod client;
pub mod error;
pub mod issue;
pub mod rate_limit;
pub mod repo;
pub mod settings;
pub mod sync;
pub mod table;
pub mod transform;

pub use error::{CifttError, Result};
