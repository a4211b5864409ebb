use crate::micro::MicroSolver;
use crate::StrError;
use russell_lab::Matrix;

/// Calculates the reference (linear) tangent stiffness by probing the micro-solver
///
/// For each Voigt component `i`, prescribes `δ` on component `i` (zero elsewhere), solves
/// from zero internal values, and sets:
///
/// ```text
/// CtanLinear[:, i] = σ̄ / δ
/// ```
///
/// **Note:** The micro-scale response must be linear-elastic for the perturbation `δ`.
pub fn calc_ctan_linear<S: MicroSolver>(solver: &mut S, delta: f64) -> Result<Matrix, StrError> {
    let nvoi = solver.nvoi();
    let virgin = vec![0.0; solver.n_internal_values()];
    let mut strain = vec![0.0; nvoi];
    let mut ctan = Matrix::new(nvoi, nvoi);
    for i in 0..nvoi {
        strain.fill(0.0);
        strain[i] = delta;
        solver.set_internal_values(&virgin)?;
        solver.prescribe_strain(&strain)?;
        let report = solver.solve()?;
        if report.nonlinear {
            log::warn!("calibration: the micro-scale response is nonlinear for component {}", i);
        }
        if !report.converged {
            log::warn!("calibration: the micro-scale solve did not converge for component {}", i);
        }
        let stress = solver.average_stress();
        for j in 0..nvoi {
            ctan.set(j, i, stress[j] / delta);
        }
    }
    Ok(ctan)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
