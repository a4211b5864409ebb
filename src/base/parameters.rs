use serde::{Deserialize, Serialize};

/// Defines the tolerance used to check that the volume fractions sum up to one
const TOL_SUM_FRACTIONS: f64 = 1e-12;

/// Holds parameters for stress-strain relations of the micro-scale phases
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ParamStressStrain {
    /// Linear elastic model
    LinearElastic {
        /// Young's modulus
        young: f64,

        /// Poisson's coefficient
        poisson: f64,
    },

    /// von Mises plasticity model with linear isotropic hardening
    VonMises {
        /// Young's modulus
        young: f64,

        /// Poisson's coefficient
        poisson: f64,

        /// Initial size of the yield surface
        ///
        /// This value corresponds to the von Mises stress:
        ///
        /// ```text
        /// f = σd - (z0 + H α)
        /// ```
        z0: f64,

        /// Hardening coefficient
        hh: f64,
    },
}

impl ParamStressStrain {
    /// Returns the Young's modulus
    pub fn young(&self) -> f64 {
        match self {
            ParamStressStrain::LinearElastic { young, .. } => *young,
            ParamStressStrain::VonMises { young, .. } => *young,
        }
    }
}

/// Holds parameters for one layer of a laminated microstructure
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ParamLayer {
    /// Volume fraction of the layer (thickness over total thickness)
    pub fraction: f64,

    /// Stress-strain model
    pub stress_strain: ParamStressStrain,
}

/// Holds parameters for a laminated microstructure (layers stacked along y)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParamLaminate {
    /// All layers (from bottom to top)
    pub layers: Vec<ParamLayer>,

    /// Maximum number of Newton-Raphson iterations
    pub n_max_iterations: usize,

    /// Tolerance for the residual norm relative to the largest Young's modulus
    pub tol_rel_residual: f64,
}

impl ParamLaminate {
    /// Allocates a new instance with default control values
    ///
    /// # Default values
    ///
    /// * `n_max_iterations = 25`
    /// * `tol_rel_residual = 1e-13`
    pub fn new(layers: &[ParamLayer]) -> Self {
        ParamLaminate {
            layers: layers.to_vec(),
            n_max_iterations: 25,
            tol_rel_residual: 1e-13,
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.layers.len() == 0 {
            return Some("there must be at least one layer".to_string());
        }
        let mut sum = 0.0;
        for (k, layer) in self.layers.iter().enumerate() {
            if layer.fraction <= 0.0 || layer.fraction > 1.0 {
                return Some(format!(
                    "fraction = {:?} of layer {} is incorrect; it must be in (0.0, 1.0]",
                    layer.fraction, k
                ));
            }
            if layer.stress_strain.young() <= 0.0 {
                return Some(format!(
                    "young = {:?} of layer {} is incorrect; it must be > 0.0",
                    layer.stress_strain.young(),
                    k
                ));
            }
            sum += layer.fraction;
        }
        if f64::abs(sum - 1.0) > TOL_SUM_FRACTIONS {
            return Some(format!(
                "the sum of fractions = {:?} is incorrect; it must be equal to 1.0",
                sum
            ));
        }
        if self.n_max_iterations < 1 {
            return Some("n_max_iterations = 0 is incorrect; it must be ≥ 1".to_string());
        }
        if self.tol_rel_residual <= 0.0 {
            return Some(format!(
                "tol_rel_residual = {:?} is incorrect; it must be > 0.0",
                self.tol_rel_residual
            ));
        }
        None // all good
    }

    /// Returns the largest Young's modulus among all layers
    pub fn young_max(&self) -> f64 {
        self.layers
            .iter()
            .fold(0.0, |acc, layer| f64::max(acc, layer.stress_strain.young()))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
