use super::{LocalState, StressStrainTrait};
use crate::StrError;
use russell_tensor::{t4_ddot_t2_update, LinElasticity, Tensor2, Tensor4};

/// Implements a linear elastic model
pub struct LinearElastic {
    pub model: LinElasticity,
}

impl LinearElastic {
    /// Allocates a new instance
    pub fn new(two_dim: bool, young: f64, poisson: f64) -> Self {
        LinearElastic {
            model: LinElasticity::new(young, poisson, two_dim, false),
        }
    }
}

impl StressStrainTrait for LinearElastic {
    /// Returns the number of internal values
    fn n_internal_values(&self) -> usize {
        0
    }

    /// Computes the consistent tangent stiffness
    fn stiffness(&mut self, dd: &mut Tensor4, _state: &LocalState) -> Result<(), StrError> {
        dd.set_tensor(1.0, self.model.get_modulus());
        Ok(())
    }

    /// Updates the stress tensor given the total strain tensor
    fn update_stress(&mut self, state: &mut LocalState, strain: &Tensor2) -> Result<(), StrError> {
        let dd = self.model.get_modulus();
        t4_ddot_t2_update(&mut state.stress, 1.0, dd, strain, 0.0); // σ = D : ε
        state.loading = false;
        state.algo_lambda = 0.0;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::LinearElastic;
    use crate::material::{LocalState, StressStrainTrait};
    use russell_lab::{approx_eq, mat_approx_eq};
    use russell_tensor::{Mandel, Tensor2, Tensor4};

    #[test]
    fn update_stress_and_stiffness_work() {
        let young = 1000.0;
        let poisson = 0.25;
        let mut model = LinearElastic::new(true, young, poisson);
        let mut state = LocalState::new(Mandel::Symmetric2D, 0);

        // uniaxial strain: σxx = (λ + 2G) εxx, σyy = σzz = λ εxx
        let mut strain = Tensor2::new(Mandel::Symmetric2D);
        strain.vector_mut()[0] = 0.01;
        state.stress.vector_mut()[0] = 123.0; // must be overwritten
        model.update_stress(&mut state, &strain).unwrap();
        let lambda = young * poisson / ((1.0 + poisson) * (1.0 - 2.0 * poisson));
        let gg = young / (2.0 * (1.0 + poisson));
        approx_eq(state.stress.vector()[0], (lambda + 2.0 * gg) * 0.01, 1e-12);
        approx_eq(state.stress.vector()[1], lambda * 0.01, 1e-12);
        approx_eq(state.stress.vector()[2], lambda * 0.01, 1e-12);
        assert_eq!(state.loading, false);

        let mut dd = Tensor4::new(Mandel::Symmetric2D);
        model.stiffness(&mut dd, &state).unwrap();
        mat_approx_eq(dd.matrix(), model.model.get_modulus().matrix(), 1e-15);
    }
}
