pub mod bit_matrix;
pub mod config;
pub mod error;
pub mod format;
pub mod value;

pub use bit_matrix::*;
pub use config::*;
pub use error::*;
pub use format::*;
pub use value::*;
