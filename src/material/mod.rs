//! Implements the stress-strain models of the micro-scale phases

mod linear_elastic;
mod local_state;
mod stress_strain;
mod von_mises;
pub use crate::material::linear_elastic::*;
pub use crate::material::local_state::*;
pub use crate::material::stress_strain::*;
pub use crate::material::von_mises::*;
