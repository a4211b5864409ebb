//! Microhom -- Computational homogenization for multiscale simulations
//!
//! Given the macroscopic strain at an integration point of a macro-scale simulation,
//! this crate computes the homogenized stress and the homogenized tangent stiffness
//! by solving a nonlinear problem on a representative volume of the microstructure.
//! Each macro integration point owns a persistent (history-dependent) micro state
//! that survives across macro load steps.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod homogenization;
pub mod material;
pub mod micro;
pub mod prelude;
