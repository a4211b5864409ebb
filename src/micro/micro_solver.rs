use crate::StrError;

/// Holds the outcome of a nonlinear micro-scale solve
///
/// Non-convergence is not an error: the solver returns its best-effort result
/// and the caller decides how to react (e.g., by reducing the macro load increment).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveReport {
    /// Indicates that at least one material point is undergoing plastic loading
    pub nonlinear: bool,

    /// Indicates that the residual norm reached the tolerance within the iteration budget
    pub converged: bool,

    /// Number of iterations performed
    pub iterations: usize,

    /// Final residual norm
    pub norm_rr: f64,
}

/// Specifies the strain-driven micro-scale solver used by the homogenization engine
///
/// Every solve starts from the internal values given by [MicroSolver::set_internal_values]
/// (i.e., the committed state); the updated internal values are exposed by
/// [MicroSolver::internal_values] but never fed back automatically.
pub trait MicroSolver {
    /// Returns the number of Voigt components (3 in 2D or 6 in 3D)
    fn nvoi(&self) -> usize;

    /// Returns the total number of internal values of the microstructure
    fn n_internal_values(&self) -> usize;

    /// Sets the committed internal values from which the next solve starts
    fn set_internal_values(&mut self, values: &[f64]) -> Result<(), StrError>;

    /// Prescribes the average (macro) strain in Voigt notation
    fn prescribe_strain(&mut self, strain: &[f64]) -> Result<(), StrError>;

    /// Solves the nonlinear micro-scale problem
    fn solve(&mut self) -> Result<SolveReport, StrError>;

    /// Returns the volume-averaged stress (Voigt) computed by the last solve
    fn average_stress(&self) -> &[f64];

    /// Returns the volume-averaged strain (Voigt) computed by the last solve
    fn average_strain(&self) -> &[f64];

    /// Returns the updated internal values computed by the last solve
    fn internal_values(&self) -> &[f64];
}
