use crate::base::invariant_i1;
use crate::StrError;
use russell_lab::{mat_vec_mul, Matrix, Vector};

/// Classifies the response of a Gauss point as linear-elastic or nonlinear
///
/// The criterion computes the trial stress `σ = CtanLinear · ε` and its first invariant I1.
/// The linear (fast) path is permitted if `|I1| < inv_max`.
///
/// **Note:** This is a necessary-condition heuristic. The caller must also check whether the
/// Gauss point has ever been driven nonlinear.
pub struct LinearCriterion {
    /// Space dimension
    ndim: usize,

    /// Threshold of the first invariant
    inv_max: f64,

    /// Reference (linear) tangent stiffness (nvoi × nvoi)
    ctan_linear: Matrix,

    /// Trial stress computed by the last call to is_linear (nvoi)
    trial_stress: Vector,

    /// Running maximum of |I1|
    pub i_reached: f64,
}

impl LinearCriterion {
    /// Allocates a new instance
    pub fn new(ndim: usize, inv_max: f64, ctan_linear: Matrix) -> Self {
        let (nvoi, _) = ctan_linear.dims();
        LinearCriterion {
            ndim,
            inv_max,
            ctan_linear,
            trial_stress: Vector::new(nvoi),
            i_reached: super::I_REACHED_INI,
        }
    }

    /// Returns the reference (linear) tangent stiffness
    pub fn ctan_linear(&self) -> &Matrix {
        &self.ctan_linear
    }

    /// Returns the trial stress computed by the last call to is_linear
    pub fn trial_stress(&self) -> &Vector {
        &self.trial_stress
    }

    /// Returns true if the linear (fast) path is permitted for the given strain
    ///
    /// Also updates the running maximum of |I1|.
    pub fn is_linear(&mut self, strain: &Vector) -> Result<bool, StrError> {
        mat_vec_mul(&mut self.trial_stress, 1.0, &self.ctan_linear, strain)?; // σ = C · ε
        let i1 = f64::abs(invariant_i1(self.ndim, &self.trial_stress));
        self.i_reached = f64::max(self.i_reached, i1);
        Ok(i1 < self.inv_max)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
