//! Implements the base structures for a homogenization analysis

mod config;
mod input;
mod parameters;
mod sample_params;
mod strain_path;
mod voigt;
pub use crate::base::config::*;
pub use crate::base::input::*;
pub use crate::base::parameters::*;
pub use crate::base::sample_params::*;
pub use crate::base::strain_path::*;
pub use crate::base::voigt::*;
