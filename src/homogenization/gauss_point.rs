use crate::StrError;
use russell_lab::Vector;
use std::fmt;

/// Defines the initial value of the running maximum of the classification invariant
pub const I_REACHED_INI: f64 = -1e10;

/// Holds the regime of a Gauss point and, if plastic, its internal values
///
/// The trial and committed buffers exist together or not at all.
#[derive(Clone, Debug)]
pub enum Regime {
    /// The Gauss point has never been driven nonlinear (all internal values are zero)
    Elastic,

    /// The Gauss point has been driven nonlinear at least once
    Plastic {
        /// Internal values accepted at the end of the previous macro step
        committed: Vector,

        /// Internal values computed by the most recent homogenization (not yet accepted)
        trial: Vector,
    },
}

impl Regime {
    /// Returns true if the Gauss point has left the elastic regime
    pub fn is_plastic(&self) -> bool {
        match self {
            Regime::Elastic => false,
            Regime::Plastic { .. } => true,
        }
    }

    /// Returns the committed internal values, if any
    pub fn committed(&self) -> Option<&Vector> {
        match self {
            Regime::Elastic => None,
            Regime::Plastic { committed, .. } => Some(committed),
        }
    }

    /// Returns the trial internal values, if any
    pub fn trial(&self) -> Option<&Vector> {
        match self {
            Regime::Elastic => None,
            Regime::Plastic { trial, .. } => Some(trial),
        }
    }

    /// Allocates the (zeroed) trial and committed buffers if the regime is elastic
    ///
    /// Returns true if the regime has changed.
    pub fn enter_plastic(&mut self, n_internal_values: usize) -> bool {
        if self.is_plastic() {
            return false;
        }
        *self = Regime::Plastic {
            committed: Vector::new(n_internal_values),
            trial: Vector::new(n_internal_values),
        };
        true
    }

    /// Copies the given values into the trial buffer (does nothing if elastic)
    pub fn stage(&mut self, values: &[f64]) -> Result<(), StrError> {
        if let Regime::Plastic { trial, .. } = self {
            if values.len() != trial.dim() {
                return Err("the number of internal values to stage is incorrect");
            }
            for i in 0..values.len() {
                trial[i] = values[i];
            }
        }
        Ok(())
    }

    /// Copies the trial values into the committed buffer (does nothing if elastic)
    pub fn commit(&mut self) {
        if let Regime::Plastic { committed, trial } = self {
            for i in 0..trial.dim() {
                committed[i] = trial[i];
            }
        }
    }
}

/// Indicates which path the last homogenization of a Gauss point has taken
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HomogenizationPath {
    /// Linear-elastic fast path (no micro-scale solve)
    Linear,

    /// Full nonlinear micro-scale solve
    Nonlinear,
}

impl fmt::Display for HomogenizationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomogenizationPath::Linear => write!(f, "linear"),
            HomogenizationPath::Nonlinear => write!(f, "nonlinear"),
        }
    }
}

/// Holds the convergence diagnostics of a Gauss point
#[derive(Clone, Debug)]
pub struct Convergence {
    /// Number of iterations of the stress solve
    pub iterations: usize,

    /// Residual norm of the stress solve
    pub norm_rr: f64,

    /// Indicates whether the stress solve has converged
    pub converged: bool,

    /// Number of iterations of each tangent-column solve (nvoi)
    pub ctan_iterations: Vec<usize>,

    /// Residual norm of each tangent-column solve (nvoi)
    pub ctan_norm_rr: Vec<f64>,

    /// Indicates whether each tangent-column solve has converged (nvoi)
    pub ctan_converged: Vec<bool>,

    /// Running maximum of the classification invariant (committed)
    pub i_reached: f64,

    /// Running maximum of the classification invariant (staged)
    pub i_reached_aux: f64,
}

impl Convergence {
    /// Allocates a new instance
    pub fn new(nvoi: usize) -> Self {
        Convergence {
            iterations: 0,
            norm_rr: 0.0,
            converged: true,
            ctan_iterations: vec![0; nvoi],
            ctan_norm_rr: vec![0.0; nvoi],
            ctan_converged: vec![true; nvoi],
            i_reached: I_REACHED_INI,
            i_reached_aux: I_REACHED_INI,
        }
    }

    /// Zeroes the iteration counters and residual norms (keeps the invariants)
    pub fn reset_counters(&mut self) {
        self.iterations = 0;
        self.norm_rr = 0.0;
        self.converged = true;
        self.reset_ctan_counters();
    }

    /// Zeroes the diagnostics of the tangent-column solves
    pub fn reset_ctan_counters(&mut self) {
        self.ctan_iterations.fill(0);
        self.ctan_norm_rr.fill(0.0);
        self.ctan_converged.fill(true);
    }

    /// Returns true if the stress solve and all tangent-column solves have converged
    pub fn all_converged(&self) -> bool {
        self.converged && self.ctan_converged.iter().all(|c| *c)
    }

    /// Promotes the staged invariant into the committed one
    pub fn promote_i_reached(&mut self) {
        self.i_reached = f64::max(self.i_reached, self.i_reached_aux);
    }
}

/// Holds the persistent state of a macro-scale integration (Gauss) point
#[derive(Clone, Debug)]
pub struct GaussPointRecord {
    /// Identifier assigned by the macro-scale caller
    pub id: usize,

    /// Last submitted strain (nvoi, Voigt notation with engineering shear strains)
    pub macro_strain: Vector,

    /// Last homogenized stress (nvoi, Voigt notation)
    pub macro_stress: Vector,

    /// Last homogenized tangent stiffness (nvoi × nvoi, row-major)
    pub macro_ctan: Vec<f64>,

    /// Regime and internal values
    pub regime: Regime,

    /// Convergence diagnostics
    pub convergence: Convergence,

    /// Path taken by the last homogenization (None if not homogenized yet)
    pub path: Option<HomogenizationPath>,
}

impl GaussPointRecord {
    /// Allocates a new (elastic) record
    pub fn new(id: usize, strain: &[f64]) -> Self {
        let nvoi = strain.len();
        let mut macro_strain = Vector::new(nvoi);
        for i in 0..nvoi {
            macro_strain[i] = strain[i];
        }
        GaussPointRecord {
            id,
            macro_strain,
            macro_stress: Vector::new(nvoi),
            macro_ctan: vec![0.0; nvoi * nvoi],
            regime: Regime::Elastic,
            convergence: Convergence::new(nvoi),
            path: None,
        }
    }

    /// Returns the number of Voigt components
    pub fn nvoi(&self) -> usize {
        self.macro_strain.dim()
    }

    /// Overwrites the macro strain
    pub fn set_macro_strain(&mut self, strain: &[f64]) {
        assert_eq!(strain.len(), self.macro_strain.dim());
        for i in 0..strain.len() {
            self.macro_strain[i] = strain[i];
        }
    }

    /// Promotes the trial state into the committed state
    pub fn commit(&mut self) {
        self.regime.commit();
        self.convergence.promote_i_reached();
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
