use super::{MicroSolver, SolveReport};
use crate::base::{modulus_mandel_to_voigt, strain_voigt_to_mandel, stress_mandel_to_voigt};
use crate::base::{Config, ParamLaminate};
use crate::material::{LocalState, StressStrain};
use crate::StrError;
use russell_lab::{solve_lin_sys, vec_norm, Matrix, Norm, Vector};
use russell_tensor::{Tensor2, Tensor4};

/// Holds the Voigt indices of the components normal to the layers in 2D (yy, xy)
const NORMAL_2D: [usize; 2] = [1, 2];

/// Holds the Voigt indices of the components normal to the layers in 3D (yy, xy, yz)
const NORMAL_3D: [usize; 3] = [1, 3, 4];

/// Implements a laminated microstructure with layers stacked along the y direction
///
/// The strain components lying in the plane of the layers (xx, zz, xz) are equal to the
/// macro strain in every layer. The components normal to the layers (yy, xy, yz) are the
/// unknowns of each layer, subject to:
///
/// ```text
/// Σ fₖ εₖ[n] = ε̄[n]                  (average strain)
/// σₖ[n] = σₖ₊₁[n]   k = 0, …, nl-2     (traction continuity)
/// ```
///
/// The nonlinear system is solved by the Newton-Raphson method. The strain-constraint
/// rows are scaled by the largest Young's modulus; hence, all residuals have units of stress.
///
/// **Note:** 2D means plane-strain.
pub struct Laminate {
    /// Space dimension
    ndim: usize,

    /// Number of Voigt components
    nvoi: usize,

    /// Volume fractions (nl)
    fractions: Vec<f64>,

    /// Stress-strain models (nl)
    models: Vec<StressStrain>,

    /// Local states (nl)
    states: Vec<LocalState>,

    /// Offsets of the internal values of each layer (nl + 1)
    offsets: Vec<usize>,

    /// Voigt indices of the normal components
    normal: &'static [usize],

    /// Reference modulus (largest Young's modulus)
    e_ref: f64,

    /// Maximum number of iterations
    n_max_iterations: usize,

    /// Tolerance for the residual norm relative to e_ref
    tol_rel_residual: f64,

    /// Prescribed macro strain ε̄ (nvoi)
    macro_strain: Vector,

    /// Committed internal values
    vars_old: Vector,

    /// Updated internal values
    vars_new: Vector,

    /// Strain of each layer (nl × nvoi)
    layer_strain: Vec<Vector>,

    /// Stress of each layer (nl × nvoi)
    layer_stress: Vec<Vector>,

    /// Tangent modulus of each layer (nl × nvoi × nvoi)
    layer_ctan: Vec<Matrix>,

    /// Auxiliary strain tensor
    eps: Tensor2,

    /// Auxiliary modulus
    dd: Tensor4,

    /// Volume-averaged stress
    average_stress: Vector,

    /// Volume-averaged strain
    average_strain: Vector,

    /// Residual vector (nl × nn)
    rr: Vector,

    /// Jacobian matrix (nl × nn, nl × nn)
    jj: Matrix,

    /// Minus the increment of the unknowns
    mdx: Vector,
}

impl Laminate {
    /// Allocates a new instance
    pub fn new(config: &Config, param: &ParamLaminate) -> Result<Self, StrError> {
        // check
        if let Some(msg) = config.validate() {
            log::error!("{}", msg);
            return Err("cannot allocate laminate because config.validate() failed");
        }
        if let Some(msg) = param.validate() {
            log::error!("{}", msg);
            return Err("cannot allocate laminate because param.validate() failed");
        }

        // constants
        let two_dim = config.ndim == 2;
        let nvoi = config.nvoi();
        let mandel = config.mandel();
        let normal: &'static [usize] = if two_dim { &NORMAL_2D } else { &NORMAL_3D };
        let nl = param.layers.len();
        let neq = nl * normal.len();

        // layers
        let mut fractions = Vec::with_capacity(nl);
        let mut models = Vec::with_capacity(nl);
        let mut states = Vec::with_capacity(nl);
        let mut offsets = vec![0; nl + 1];
        for (k, layer) in param.layers.iter().enumerate() {
            let model = StressStrain::new(two_dim, &layer.stress_strain)?;
            let n_internal_values = model.actual.n_internal_values();
            offsets[k + 1] = offsets[k] + n_internal_values;
            fractions.push(layer.fraction);
            states.push(LocalState::new(mandel, n_internal_values));
            models.push(model);
        }
        let n_int_var = offsets[nl];

        // allocate new instance
        Ok(Laminate {
            ndim: config.ndim,
            nvoi,
            fractions,
            models,
            states,
            offsets,
            normal,
            e_ref: param.young_max(),
            n_max_iterations: param.n_max_iterations,
            tol_rel_residual: param.tol_rel_residual,
            macro_strain: Vector::new(nvoi),
            vars_old: Vector::new(n_int_var),
            vars_new: Vector::new(n_int_var),
            layer_strain: vec![Vector::new(nvoi); nl],
            layer_stress: vec![Vector::new(nvoi); nl],
            layer_ctan: vec![Matrix::new(nvoi, nvoi); nl],
            eps: Tensor2::new(mandel),
            dd: Tensor4::new(mandel),
            average_stress: Vector::new(nvoi),
            average_strain: Vector::new(nvoi),
            rr: Vector::new(neq),
            jj: Matrix::new(neq, neq),
            mdx: Vector::new(neq),
        })
    }

    /// Returns the space dimension
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Returns the number of layers
    pub fn n_layers(&self) -> usize {
        self.fractions.len()
    }

    /// Returns the strain (Voigt) of a layer computed by the last solve
    pub fn layer_strain(&self, k: usize) -> &Vector {
        &self.layer_strain[k]
    }

    /// Returns the stress (Voigt) of a layer computed by the last solve
    pub fn layer_stress(&self, k: usize) -> &Vector {
        &self.layer_stress[k]
    }

    /// Updates the stress and the tangent of all layers and calculates the residual vector
    ///
    /// Returns whether any layer is undergoing plastic loading.
    fn evaluate(&mut self) -> Result<bool, StrError> {
        let mut nonlinear = false;
        let nl = self.fractions.len();
        let nn = self.normal.len();
        for k in 0..nl {
            let (start, end) = (self.offsets[k], self.offsets[k + 1]);
            let state = &mut self.states[k];
            state.set_internal_values(&self.vars_old.as_data()[start..end]);
            strain_voigt_to_mandel(&mut self.eps, self.layer_strain[k].as_data())?;
            self.models[k].actual.update_stress(state, &self.eps)?;
            self.models[k].actual.stiffness(&mut self.dd, state)?;
            modulus_mandel_to_voigt(&mut self.layer_ctan[k], &self.dd);
            stress_mandel_to_voigt(&mut self.layer_stress[k], &state.stress);
            for i in 0..(end - start) {
                self.vars_new[start + i] = state.internal_values[i];
            }
            nonlinear = nonlinear || state.loading;
        }

        // average strain: e_ref (Σ fₖ εₖ[n] - ε̄[n])
        for a in 0..nn {
            let n = self.normal[a];
            let mut sum = 0.0;
            for k in 0..nl {
                sum += self.fractions[k] * self.layer_strain[k][n];
            }
            self.rr[a] = self.e_ref * (sum - self.macro_strain[n]);
        }

        // traction continuity: σₖ[n] - σₖ₊₁[n]
        for k in 0..(nl - 1) {
            for a in 0..nn {
                let n = self.normal[a];
                self.rr[(k + 1) * nn + a] = self.layer_stress[k][n] - self.layer_stress[k + 1][n];
            }
        }
        Ok(nonlinear)
    }

    /// Assembles the Jacobian matrix using the tangent modulus of each layer
    fn assemble_jacobian(&mut self) {
        let nl = self.fractions.len();
        let nn = self.normal.len();
        self.jj.fill(0.0);
        for k in 0..nl {
            for a in 0..nn {
                self.jj.set(a, k * nn + a, self.e_ref * self.fractions[k]);
            }
        }
        for k in 0..(nl - 1) {
            for a in 0..nn {
                let row = (k + 1) * nn + a;
                for b in 0..nn {
                    let (na, nb) = (self.normal[a], self.normal[b]);
                    self.jj.set(row, k * nn + b, self.layer_ctan[k].get(na, nb));
                    self.jj.set(row, (k + 1) * nn + b, -self.layer_ctan[k + 1].get(na, nb));
                }
            }
        }
    }
}

impl MicroSolver for Laminate {
    /// Returns the number of Voigt components (3 in 2D or 6 in 3D)
    fn nvoi(&self) -> usize {
        self.nvoi
    }

    /// Returns the total number of internal values of all layers
    fn n_internal_values(&self) -> usize {
        self.vars_old.dim()
    }

    /// Sets the committed internal values from which the next solve starts
    fn set_internal_values(&mut self, values: &[f64]) -> Result<(), StrError> {
        if values.len() != self.vars_old.dim() {
            return Err("the number of internal values is incorrect");
        }
        for i in 0..values.len() {
            self.vars_old[i] = values[i];
        }
        Ok(())
    }

    /// Prescribes the average (macro) strain in Voigt notation
    fn prescribe_strain(&mut self, strain: &[f64]) -> Result<(), StrError> {
        if strain.len() != self.nvoi {
            return Err("strain vector must have nvoi components");
        }
        for i in 0..self.nvoi {
            self.macro_strain[i] = strain[i];
        }
        Ok(())
    }

    /// Solves the nonlinear problem by the Newton-Raphson method
    fn solve(&mut self) -> Result<SolveReport, StrError> {
        // initial guess: uniform strain
        let nl = self.fractions.len();
        let nn = self.normal.len();
        for k in 0..nl {
            for i in 0..self.nvoi {
                self.layer_strain[k][i] = self.macro_strain[i];
            }
        }

        // iterations
        let tol = self.tol_rel_residual * self.e_ref;
        let mut iterations = 0;
        let mut converged = false;
        let mut nonlinear;
        let mut norm_rr;
        loop {
            nonlinear = self.evaluate()?;
            norm_rr = vec_norm(&self.rr, Norm::Max);
            if !norm_rr.is_finite() {
                return Err("found NaN or Inf in the residual of the laminate");
            }
            if norm_rr <= tol {
                converged = true;
                break;
            }
            if iterations == self.n_max_iterations {
                break;
            }

            // solve J · mdx = R and update the normal strains: x ← x - mdx
            self.assemble_jacobian();
            for i in 0..self.rr.dim() {
                self.mdx[i] = self.rr[i];
            }
            solve_lin_sys(&mut self.mdx, &mut self.jj)?;
            for k in 0..nl {
                for b in 0..nn {
                    let n = self.normal[b];
                    self.layer_strain[k][n] -= self.mdx[k * nn + b];
                }
            }
            iterations += 1;
        }
        if !converged {
            log::debug!(
                "laminate did not converge after {} iterations; |R| = {:e}",
                iterations,
                norm_rr
            );
        }

        // volume averages
        self.average_stress.fill(0.0);
        self.average_strain.fill(0.0);
        for k in 0..nl {
            let f = self.fractions[k];
            for i in 0..self.nvoi {
                self.average_stress[i] += f * self.layer_stress[k][i];
                self.average_strain[i] += f * self.layer_strain[k][i];
            }
        }
        Ok(SolveReport {
            nonlinear,
            converged,
            iterations,
            norm_rr,
        })
    }

    /// Returns the volume-averaged stress (Voigt) computed by the last solve
    fn average_stress(&self) -> &[f64] {
        self.average_stress.as_data()
    }

    /// Returns the volume-averaged strain (Voigt) computed by the last solve
    fn average_strain(&self) -> &[f64] {
        self.average_strain.as_data()
    }

    /// Returns the updated internal values computed by the last solve
    fn internal_values(&self) -> &[f64] {
        self.vars_new.as_data()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
