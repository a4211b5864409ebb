use super::{LocalState, StressStrainTrait};
use crate::StrError;
use russell_tensor::{t4_ddot_t2_update, LinElasticity, Mandel, Tensor2, Tensor4};
use russell_tensor::{IDENTITY2, P_SYMDEV, SQRT_2_BY_3};

/// Defines an alias to IDENTITY2
const I: &[f64; 9] = &IDENTITY2;

/// Defines an alias to P_SYMDEV
const PSD: &[[f64; 9]; 9] = &P_SYMDEV;

/// Implements the von Mises plasticity model with linear isotropic hardening
///
/// The model is written in terms of the total strain; thus, the internal values are:
///
/// ```text
/// Z = [εp₀, εp₁, …, εpₙ, α]
/// ```
///
/// where `εp` is the plastic strain tensor (Mandel components) and `α` is the
/// accumulated (equivalent) plastic strain. The yield function is:
///
/// ```text
/// f = σd - (z0 + H α)
/// ```
///
/// **Note:** This model works in 2D (plane-strain only) or 3D.
pub struct VonMises {
    /// Linear elasticity
    lin_elasticity: LinElasticity,

    /// Number of Mandel components
    ncp: usize,

    /// Bulk modulus K
    kk: f64,

    /// Shear modulus G
    gg: f64,

    /// Hardening coefficient
    hh: f64,

    /// Initial size of the yield surface
    z0: f64,

    /// Elastic strain: εe = ε - εp
    eps_e: Tensor2,

    /// Deviatoric stress: s = dev(σ)
    s: Tensor2,
}

impl VonMises {
    /// Allocates a new instance
    pub fn new(two_dim: bool, young: f64, poisson: f64, z0: f64, hh: f64) -> Self {
        let mandel = if two_dim { Mandel::Symmetric2D } else { Mandel::Symmetric };
        let lin_elasticity = LinElasticity::new(young, poisson, two_dim, false);
        let (kk, gg) = lin_elasticity.get_bulk_shear();
        VonMises {
            lin_elasticity,
            ncp: mandel.dim(),
            kk,
            gg,
            hh,
            z0,
            eps_e: Tensor2::new(mandel),
            s: Tensor2::new(mandel),
        }
    }

    /// Calculates the yield function f given the stress and the accumulated plastic strain
    fn yield_function(&self, stress: &Tensor2, alpha: f64) -> f64 {
        stress.invariant_sigma_d() - (self.z0 + self.hh * alpha)
    }

    /// Calculates the deviator of a tensor
    fn deviator(dev: &mut Tensor2, tensor: &Tensor2) {
        let sigma_m = tensor.invariant_sigma_m();
        let vec = tensor.vector();
        let out = dev.vector_mut();
        for i in 0..vec.dim() {
            out[i] = vec[i] - sigma_m * I[i];
        }
    }
}

impl StressStrainTrait for VonMises {
    /// Returns the number of internal values
    fn n_internal_values(&self) -> usize {
        self.ncp + 1 // [εp, α]
    }

    /// Computes the consistent tangent stiffness
    fn stiffness(&mut self, dd: &mut Tensor4, state: &LocalState) -> Result<(), StrError> {
        // handle elastic case
        if !state.loading {
            dd.set_tensor(1.0, self.lin_elasticity.get_modulus()); // D ← Dₑ
            return Ok(());
        }

        // extract current state variables
        let sigma = &state.stress;
        let lambda = state.algo_lambda;
        VonMises::deviator(&mut self.s, sigma); // s = dev(σ)

        // coefficients
        let (kk, gg, hh) = (self.kk, self.gg, self.hh);
        let sigma_d = sigma.invariant_sigma_d();
        let sigma_d_trial = sigma_d + lambda * 3.0 * gg;
        let norm_s = sigma_d * SQRT_2_BY_3;
        let d = 3.0 * gg + hh;
        let a = 2.0 * gg * (1.0 - lambda * 3.0 * gg / sigma_d_trial);
        let b = 6.0 * gg * gg * (lambda / sigma_d_trial - 1.0 / d) / (norm_s * norm_s);

        // access Mandel representation
        let nd = self.ncp;
        let mat = dd.matrix_mut();
        let s = self.s.vector();

        // consistent tangent modulus
        for i in 0..nd {
            for j in 0..nd {
                mat.set(i, j, a * PSD[i][j] + b * s[i] * s[j] + kk * I[i] * I[j]);
            }
        }
        Ok(())
    }

    /// Updates the stress tensor given the total strain tensor
    fn update_stress(&mut self, state: &mut LocalState, strain: &Tensor2) -> Result<(), StrError> {
        // reset flags
        state.loading = false; // not elastoplastic by default
        state.algo_lambda = 0.0;

        // elastic strain: εe = ε - εp
        let nd = self.ncp;
        let alpha = state.internal_values[nd];
        {
            let eps = strain.vector();
            let eps_e = self.eps_e.vector_mut();
            for i in 0..nd {
                eps_e[i] = eps[i] - state.internal_values[i];
            }
        }

        // trial stress: σ ← σ_trial = D : εe
        let dd = self.lin_elasticity.get_modulus();
        t4_ddot_t2_update(&mut state.stress, 1.0, dd, &self.eps_e, 0.0);

        // elastic update
        let f_trial = self.yield_function(&state.stress, alpha);
        if f_trial <= 0.0 {
            return Ok(());
        }

        // coefficients
        let (gg, hh) = (self.gg, self.hh);
        let sigma_m_trial = state.stress.invariant_sigma_m();
        let sigma_d_trial = state.stress.invariant_sigma_d();
        let lambda = f_trial / (3.0 * gg + hh);
        let m = 1.0 - lambda * 3.0 * gg / sigma_d_trial;

        // s_trial = dev(σ_trial)
        VonMises::deviator(&mut self.s, &state.stress);

        // σ_new = m s_trial + σm_trial I
        let vec = state.stress.vector_mut();
        let s_trial = self.s.vector();
        for i in 0..nd {
            vec[i] = m * s_trial[i] + sigma_m_trial * I[i];
        }

        // εp_new = εp_old + Λ (3/2) s_trial / σd_trial
        for i in 0..nd {
            state.internal_values[i] += lambda * 1.5 * s_trial[i] / sigma_d_trial;
        }

        // α_new = α_old + Λ
        state.internal_values[nd] = alpha + lambda;

        // elastoplastic update
        state.loading = true;
        state.algo_lambda = lambda;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::VonMises;
    use crate::material::{LocalState, StressStrainTrait};
    use russell_lab::{approx_eq, Matrix};
    use russell_tensor::{Mandel, Tensor2, Tensor4};

    // plane-strain strain reaching the yield surface (εx, εy) with εz = 0
    fn yield_strain(young: f64, poisson: f64, z0: f64) -> (f64, f64) {
        let nu = poisson;
        let nu2 = poisson * poisson;
        let dy = z0 * (1.0 - nu2) / (young * f64::sqrt(1.0 - nu + nu2));
        let eps_x = dy * nu / (1.0 - nu);
        let eps_y = -dy;
        (eps_x, eps_y)
    }

    #[test]
    fn update_stress_works() {
        let young = 1500.0;
        let poisson = 0.25;
        let z0 = 9.0;
        let hh = 800.0;
        let gg = young / (2.0 * (1.0 + poisson));
        let mut model = VonMises::new(true, young, poisson, z0, hh);
        assert_eq!(model.n_internal_values(), 5);
        let mut state = LocalState::new(Mandel::Symmetric2D, 5);
        let (eps_x, eps_y) = yield_strain(young, poisson, z0);

        // elastic (below the yield surface)
        let mut strain = Tensor2::new(Mandel::Symmetric2D);
        strain.vector_mut()[0] = 0.9999 * eps_x;
        strain.vector_mut()[1] = 0.9999 * eps_y;
        model.update_stress(&mut state, &strain).unwrap();
        assert_eq!(state.loading, false);
        assert_eq!(state.internal_values[4], 0.0);
        approx_eq(state.stress.invariant_sigma_d(), 0.9999 * z0, 1e-10);

        // elastoplastic (twice the yield strain)
        strain.vector_mut()[0] = 2.0 * eps_x;
        strain.vector_mut()[1] = 2.0 * eps_y;
        model.update_stress(&mut state, &strain).unwrap();
        assert_eq!(state.loading, true);
        let lambda = state.algo_lambda;
        approx_eq(lambda, 3.461538461538463E-03, 1e-14);
        approx_eq(state.internal_values[4], lambda, 1e-14);
        approx_eq(state.stress.invariant_sigma_d(), z0 + hh * lambda, 1e-12);

        // the plastic strain is deviatoric with norm √(3/2) Λ
        let eps_p = &state.internal_values;
        approx_eq(eps_p[0] + eps_p[1] + eps_p[2], 0.0, 1e-15);
        let norm_eps_p = f64::sqrt(eps_p[0] * eps_p[0] + eps_p[1] * eps_p[1] + eps_p[2] * eps_p[2] + eps_p[3] * eps_p[3]);
        approx_eq(norm_eps_p, f64::sqrt(1.5) * lambda, 1e-14);

        // the elastic strain reproduces the stress
        approx_eq(state.stress.invariant_sigma_d(), 2.0 * z0 - 3.0 * gg * lambda, 1e-10);
    }

    #[test]
    fn update_stress_starts_from_committed_values() {
        let young = 1500.0;
        let poisson = 0.25;
        let z0 = 9.0;
        let hh = 800.0;
        let mut model = VonMises::new(true, young, poisson, z0, hh);
        let mut state = LocalState::new(Mandel::Symmetric2D, 5);
        let (eps_x, eps_y) = yield_strain(young, poisson, z0);
        let mut strain = Tensor2::new(Mandel::Symmetric2D);
        strain.vector_mut()[0] = 2.0 * eps_x;
        strain.vector_mut()[1] = 2.0 * eps_y;

        // the same strain from the same committed values gives the same result
        model.update_stress(&mut state, &strain).unwrap();
        let first = state.stress.vector().clone();
        let updated = state.internal_values.clone();
        state.set_internal_values(&[0.0, 0.0, 0.0, 0.0, 0.0]);
        model.update_stress(&mut state, &strain).unwrap();
        assert_eq!(state.stress.vector().as_data(), first.as_data());
        assert_eq!(state.internal_values.as_data(), updated.as_data());

        // unloading to zero strain from the updated values is elastic with residual stress
        state.set_internal_values(updated.as_data());
        strain.vector_mut().fill(0.0);
        model.update_stress(&mut state, &strain).unwrap();
        assert_eq!(state.loading, false);
        approx_eq(state.internal_values[4], updated[4], 1e-15);
        assert!(state.stress.invariant_sigma_d() > 0.0);
    }

    #[test]
    fn stiffness_works() {
        let young = 1500.0;
        let poisson = 0.25;
        let z0 = 9.0;
        let hh = 800.0;
        let mut model = VonMises::new(true, young, poisson, z0, hh);
        let mut dd = Tensor4::new(Mandel::Symmetric2D);
        let mut state = LocalState::new(Mandel::Symmetric2D, 5);
        let (eps_x, eps_y) = yield_strain(young, poisson, z0);
        let map = &[0, 1, 3];

        // elastic
        let mut strain = Tensor2::new(Mandel::Symmetric2D);
        strain.vector_mut()[0] = 0.9999 * eps_x;
        strain.vector_mut()[1] = 0.9999 * eps_y;
        model.update_stress(&mut state, &strain).unwrap();
        model.stiffness(&mut dd, &state).unwrap();
        let dd_spo = Matrix::from(&[
            [1.800000000000000E+03, 6.000000000000000E+02, 0.000000000000000E+00],
            [6.000000000000000E+02, 1.800000000000000E+03, 0.000000000000000E+00],
            [0.000000000000000E+00, 0.000000000000000E+00, 6.000000000000000E+02],
        ]);
        for i in 0..3 {
            for j in 0..3 {
                let m = if i == 2 && j == 2 { 2.0 } else { 1.0 };
                approx_eq(dd.matrix().get(map[i], map[j]), m * dd_spo.get(i, j), 1e-12);
            }
        }

        // elastoplastic
        strain.vector_mut()[0] = 2.0 * eps_x;
        strain.vector_mut()[1] = 2.0 * eps_y;
        state.set_internal_values(&[0.0, 0.0, 0.0, 0.0, 0.0]);
        model.update_stress(&mut state, &strain).unwrap();
        model.stiffness(&mut dd, &state).unwrap();
        let dd_spo = Matrix::from(&[
            [1.389940828402367E+03, 9.248520710059172E+02, 0.0],
            [9.248520710059172E+02, 1.262130177514793E+03, 0.0],
            [0.0, 0.0, 3.923076923076923E+02],
        ]);
        for i in 0..3 {
            for j in 0..3 {
                let m = if i == 2 && j == 2 { 2.0 } else { 1.0 };
                approx_eq(dd.matrix().get(map[i], map[j]), m * dd_spo.get(i, j), 1e-9);
            }
        }
    }
}
