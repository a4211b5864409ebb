use super::{MicroSolver, SolveReport};
use crate::StrError;

/// Wraps a micro-solver and counts the number of calls to solve
///
/// Useful to check how many nonlinear solves the homogenization performs.
pub struct CountingSolver<S: MicroSolver> {
    /// Holds the actual solver
    pub actual: S,

    /// Number of calls to solve since the last reset
    n_solve: usize,
}

impl<S: MicroSolver> CountingSolver<S> {
    /// Allocates a new instance
    pub fn new(actual: S) -> Self {
        CountingSolver { actual, n_solve: 0 }
    }

    /// Returns the number of calls to solve since the last reset
    pub fn n_solve(&self) -> usize {
        self.n_solve
    }

    /// Resets the counter
    pub fn reset(&mut self) {
        self.n_solve = 0;
    }
}

impl<S: MicroSolver> MicroSolver for CountingSolver<S> {
    fn nvoi(&self) -> usize {
        self.actual.nvoi()
    }

    fn n_internal_values(&self) -> usize {
        self.actual.n_internal_values()
    }

    fn set_internal_values(&mut self, values: &[f64]) -> Result<(), StrError> {
        self.actual.set_internal_values(values)
    }

    fn prescribe_strain(&mut self, strain: &[f64]) -> Result<(), StrError> {
        self.actual.prescribe_strain(strain)
    }

    fn solve(&mut self) -> Result<SolveReport, StrError> {
        self.n_solve += 1;
        self.actual.solve()
    }

    fn average_stress(&self) -> &[f64] {
        self.actual.average_stress()
    }

    fn average_strain(&self) -> &[f64] {
        self.actual.average_strain()
    }

    fn internal_values(&self) -> &[f64] {
        self.actual.internal_values()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
