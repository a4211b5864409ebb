//! Implements the localization-homogenization engine

mod calibration;
mod gauss_point;
mod homogenizer;
mod linear_criterion;
mod registry;
mod tangent;
pub use crate::homogenization::calibration::*;
pub use crate::homogenization::gauss_point::*;
pub use crate::homogenization::homogenizer::*;
pub use crate::homogenization::linear_criterion::*;
pub use crate::homogenization::registry::*;
pub use crate::homogenization::tangent::*;
