use super::Convergence;
use crate::micro::MicroSolver;
use crate::StrError;
use russell_lab::Vector;

/// Calculates the homogenized tangent stiffness by forward finite differences
///
/// Given the base strain `ε₀` and the corresponding stress `σ₀`, for each Voigt component `i`:
///
/// ```text
/// ε₁ = ε₀ + δε eᵢ
/// ctan[:, i] = (σ₁ - σ₀) / δε
/// ```
///
/// Every perturbed solve starts from the same internal values `vars_old`. The iterations and
/// residual norm of each perturbed solve are recorded in `convergence`.
///
/// # Output
///
/// * `ctan` -- (nvoi × nvoi, row-major) the tangent stiffness
/// * `convergence` -- the per-column diagnostics
///
/// # Input
///
/// * `solver` -- the micro-solver
/// * `vars_old` -- the committed internal values
/// * `strain` -- the base strain ε₀
/// * `stress` -- the base stress σ₀
/// * `delta` -- the perturbation δε
/// * `tol_filter` -- sets to zero the entries with magnitude below this tolerance
pub fn calc_ctan_fd<S: MicroSolver>(
    ctan: &mut [f64],
    convergence: &mut Convergence,
    solver: &mut S,
    vars_old: &[f64],
    strain: &Vector,
    stress: &Vector,
    delta: f64,
    tol_filter: Option<f64>,
) -> Result<(), StrError> {
    let nvoi = strain.dim();
    assert_eq!(ctan.len(), nvoi * nvoi);
    let mut strain_1 = strain.as_data().clone();
    for i in 0..nvoi {
        strain_1[i] += delta;
        solver.set_internal_values(vars_old)?;
        solver.prescribe_strain(&strain_1)?;
        let report = solver.solve()?;
        strain_1[i] = strain[i];
        convergence.ctan_iterations[i] = report.iterations;
        convergence.ctan_norm_rr[i] = report.norm_rr;
        convergence.ctan_converged[i] = report.converged;
        if !report.converged {
            log::warn!(
                "tangent column {} did not converge after {} iterations; |R| = {:e}",
                i,
                report.iterations,
                report.norm_rr
            );
        }
        let stress_1 = solver.average_stress();
        for j in 0..nvoi {
            let value = (stress_1[j] - stress[j]) / delta;
            ctan[j * nvoi + i] = match tol_filter {
                Some(tol) if f64::abs(value) < tol => 0.0,
                _ => value,
            };
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
