//! Implements the micro-scale solvers (representative volume elements)

mod counting_solver;
mod laminate;
mod micro_solver;
pub use crate::micro::counting_solver::*;
pub use crate::micro::laminate::*;
pub use crate::micro::micro_solver::*;
