//! Makes available common structures needed to run a homogenization
//!
//! You may write `use microhom::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{Config, ParamLaminate, ParamLayer, ParamStressStrain, SampleParams, StrainPath};
pub use crate::homogenization::{Convergence, HomogenizationPath, Homogenizer, Regime};
pub use crate::micro::{CountingSolver, Laminate, MicroSolver, SolveReport};
