pub mod error;

pub use error::{AdminError, GENERIC_ERROR_MESSAGE, Result};
