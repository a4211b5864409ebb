use super::nvoi_from_ndim;
use russell_tensor::Mandel;
use serde::{Deserialize, Serialize};

/// Defines the default perturbation used to calibrate the reference (linear) stiffness
pub const DEFAULT_DELTA_CALIBRATION: f64 = 1e-8;

/// Defines the default perturbation used to compute the tangent stiffness by finite differences
pub const DEFAULT_DELTA_TANGENT: f64 = 1e-10;

/// Defines the smallest allowed strain perturbation
pub const CONFIG_MIN_DELTA: f64 = 1e-14;

/// Holds the configuration of the localization-homogenization engine
///
/// # Default values
///
/// * `inv_max = 1e-2` (same units as the stress)
/// * `delta_calibration = 1e-8`
/// * `delta_tangent = 1e-10`
/// * `with_tangent = true`
/// * `tol_filter_ctan = None`
/// * `verbose = false`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Space dimension (2 or 3)
    pub ndim: usize,

    /// Threshold of the first stress invariant below which the linear (fast) path is allowed
    ///
    /// ```text
    /// linear = |I1(CtanLinear · ε)| < inv_max
    /// ```
    pub inv_max: f64,

    /// Strain perturbation δ used to calibrate the reference stiffness CtanLinear
    pub delta_calibration: f64,

    /// Strain perturbation δε used to compute the tangent stiffness by finite differences
    pub delta_tangent: f64,

    /// Computes the homogenized tangent stiffness during the batch homogenization
    pub with_tangent: bool,

    /// Sets to zero the tangent stiffness entries with magnitude below this tolerance
    pub tol_filter_ctan: Option<f64>,

    /// Prints a table with the convergence data after each batch homogenization
    pub verbose: bool,
}

impl Config {
    /// Allocates a new instance with default values
    pub fn new(ndim: usize) -> Self {
        Config {
            ndim,
            inv_max: 1e-2,
            delta_calibration: DEFAULT_DELTA_CALIBRATION,
            delta_tangent: DEFAULT_DELTA_TANGENT,
            with_tangent: true,
            tol_filter_ctan: None,
            verbose: false,
        }
    }

    /// Returns the number of components in Voigt notation (3 in 2D or 6 in 3D)
    pub fn nvoi(&self) -> usize {
        nvoi_from_ndim(self.ndim)
    }

    /// Returns the Mandel representation of the micro-scale tensors
    ///
    /// **Note:** 2D means plane-strain.
    pub fn mandel(&self) -> Mandel {
        if self.ndim == 2 {
            Mandel::Symmetric2D
        } else {
            Mandel::Symmetric
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.ndim != 2 && self.ndim != 3 {
            return Some(format!("ndim = {} is incorrect; it must be 2 or 3", self.ndim));
        }
        if self.inv_max < 0.0 {
            return Some(format!("inv_max = {:?} is incorrect; it must be ≥ 0.0", self.inv_max));
        }
        if self.delta_calibration < CONFIG_MIN_DELTA {
            return Some(format!(
                "delta_calibration = {:?} is incorrect; it must be ≥ {:e}",
                self.delta_calibration, CONFIG_MIN_DELTA
            ));
        }
        if self.delta_tangent < CONFIG_MIN_DELTA {
            return Some(format!(
                "delta_tangent = {:?} is incorrect; it must be ≥ {:e}",
                self.delta_tangent, CONFIG_MIN_DELTA
            ));
        }
        if let Some(tol) = self.tol_filter_ctan {
            if tol < 0.0 {
                return Some(format!("tol_filter_ctan = {:?} is incorrect; it must be ≥ 0.0", tol));
            }
        }
        None // all good
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
