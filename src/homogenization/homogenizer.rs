use super::{calc_ctan_fd, calc_ctan_linear, Convergence, GaussPointRecord, HomogenizationPath};
use super::{LinearCriterion, Registry};
use crate::base::Config;
use crate::micro::MicroSolver;
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Implements the localization-homogenization engine
///
/// Each Gauss point of the macro-scale simulation is identified by an id and owns a persistent
/// micro-scale history. The typical sequence of calls is:
///
/// ```text
/// calibrate()                           once, before anything else
/// loop over macro steps
///     loop over macro iterations
///         set_macro_strain(id, ε)       for every Gauss point
///         localize_homogenize()
///         get_macro_stress(id)
///         get_macro_ctan(id)
///     update_internal_variables()       once the macro step is accepted
/// ```
pub struct Homogenizer<S: MicroSolver> {
    /// Configuration
    config: Config,

    /// Micro-scale solver
    solver: S,

    /// Gauss point records
    registry: Registry,

    /// Regime classifier (None if not calibrated)
    criterion: Option<LinearCriterion>,

    /// Committed internal values of the Gauss point being homogenized
    vars_old: Vector,
}

impl<S: MicroSolver> Homogenizer<S> {
    /// Allocates a new instance
    pub fn new(config: &Config, solver: S) -> Result<Self, StrError> {
        if let Some(msg) = config.validate() {
            log::error!("{}", msg);
            return Err("cannot allocate homogenizer because config.validate() failed");
        }
        if solver.nvoi() != config.nvoi() {
            return Err("the number of Voigt components of the micro-solver is inconsistent with ndim");
        }
        let n_int_var = solver.n_internal_values();
        Ok(Homogenizer {
            config: config.clone(),
            solver,
            registry: Registry::new(config.nvoi()),
            criterion: None,
            vars_old: Vector::new(n_int_var),
        })
    }

    /// Calculates the reference (linear) tangent stiffness
    ///
    /// Must be called exactly once, before any homogenization.
    pub fn calibrate(&mut self) -> Result<(), StrError> {
        if self.criterion.is_some() {
            return Err("the reference stiffness is already calibrated");
        }
        let ctan_linear = calc_ctan_linear(&mut self.solver, self.config.delta_calibration)?;
        log::debug!("calibrated the reference stiffness:\n{}", ctan_linear);
        self.criterion = Some(LinearCriterion::new(
            self.config.ndim,
            self.config.inv_max,
            ctan_linear,
        ));
        Ok(())
    }

    /// Returns the reference (linear) tangent stiffness
    pub fn get_ctan_linear(&self) -> Result<&Matrix, StrError> {
        match &self.criterion {
            Some(criterion) => Ok(criterion.ctan_linear()),
            None => Err("the reference stiffness is not calibrated; call calibrate first"),
        }
    }

    /// Sets the macro strain of a Gauss point (allocates a new record if the id is new)
    pub fn set_macro_strain(&mut self, id: usize, strain: &[f64]) -> Result<(), StrError> {
        if self.registry.upsert(id, strain)? {
            log::debug!("allocated Gauss point {}", id);
        }
        Ok(())
    }

    /// Homogenizes the stress (and the tangent, if configured) of all Gauss points
    pub fn localize_homogenize(&mut self) -> Result<(), StrError> {
        let criterion = self
            .criterion
            .as_mut()
            .ok_or("the reference stiffness is not calibrated; call calibrate first")?;
        for record in self.registry.iter_mut() {
            homogenize_record(
                record,
                criterion,
                &mut self.solver,
                &mut self.vars_old,
                &self.config,
                self.config.with_tangent,
            )?;
        }
        if self.config.verbose {
            self.print_table();
        }
        Ok(())
    }

    /// Sets the strain of a single Gauss point and returns its homogenized stress
    ///
    /// The tangent is not computed. A new record is allocated if the id is new.
    pub fn homogenize_stress(&mut self, id: usize, strain: &[f64]) -> Result<&[f64], StrError> {
        self.homogenize_one(id, strain, false)?;
        Ok(self.registry.get(id)?.macro_stress.as_data().as_slice())
    }

    /// Sets the strain of a single Gauss point and returns its homogenized tangent (row-major)
    ///
    /// A new record is allocated if the id is new.
    pub fn homogenize_ctan(&mut self, id: usize, strain: &[f64]) -> Result<&[f64], StrError> {
        self.homogenize_one(id, strain, true)?;
        Ok(self.registry.get(id)?.macro_ctan.as_slice())
    }

    /// Commits the trial internal values of all Gauss points
    ///
    /// Must be called once per accepted macro step, never per macro iteration.
    pub fn update_internal_variables(&mut self) {
        for record in self.registry.iter_mut() {
            record.commit();
            if record.regime.is_plastic() {
                log::debug!("committed the internal values of Gauss point {}", record.id);
            }
        }
    }

    /// Returns the last homogenized stress of a Gauss point
    pub fn get_macro_stress(&self, id: usize) -> Result<&[f64], StrError> {
        Ok(self.registry.get(id)?.macro_stress.as_data().as_slice())
    }

    /// Returns the last homogenized tangent stiffness of a Gauss point (nvoi × nvoi, row-major)
    pub fn get_macro_ctan(&self, id: usize) -> Result<&[f64], StrError> {
        Ok(self.registry.get(id)?.macro_ctan.as_slice())
    }

    /// Returns the committed internal values of a Gauss point (None if it has never left the elastic regime)
    pub fn get_committed_internal_values(&self, id: usize) -> Result<Option<&[f64]>, StrError> {
        Ok(self.registry.get(id)?.regime.committed().map(|v| v.as_data().as_slice()))
    }

    /// Returns the trial internal values of a Gauss point (None if it has never left the elastic regime)
    pub fn get_trial_internal_values(&self, id: usize) -> Result<Option<&[f64]>, StrError> {
        Ok(self.registry.get(id)?.regime.trial().map(|v| v.as_data().as_slice()))
    }

    /// Returns the convergence diagnostics of a Gauss point
    pub fn get_convergence(&self, id: usize) -> Result<&Convergence, StrError> {
        Ok(&self.registry.get(id)?.convergence)
    }

    /// Returns the path taken by the last homogenization of a Gauss point
    pub fn get_path(&self, id: usize) -> Result<Option<HomogenizationPath>, StrError> {
        Ok(self.registry.get(id)?.path)
    }

    /// Returns an access to the Gauss point records
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns an access to the micro-solver
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Returns a mutable access to the micro-solver
    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    /// Prints a table with the convergence data of all Gauss points
    pub fn print_table(&self) {
        println!("Legend:");
        println!("✅ : converged");
        println!("🥵 : not converged");
        println!("➖ : linear path (no micro-scale solve)\n");
        println!(
            "{:>8} {:>10} {:>5} {:>8}   {:>9} {:>9}   {:>13}",
            "id", "path", "iter", "|R|", "ctan_iter", "ctan_|R|", "I_reached"
        );
        for record in self.registry.iter() {
            let conv = &record.convergence;
            let path = match record.path {
                Some(p) => format!("{}", p),
                None => "-".to_string(),
            };
            let l = match record.path {
                Some(HomogenizationPath::Nonlinear) => {
                    if conv.all_converged() {
                        "✅"
                    } else {
                        "🥵"
                    }
                }
                _ => "➖",
            };
            let ctan_iter = conv.ctan_iterations.iter().max().unwrap_or(&0);
            let ctan_norm = conv.ctan_norm_rr.iter().fold(0.0, |acc: f64, v| acc.max(*v));
            println!(
                "{:>8} {:>10} {:>5} {:>8.2e}{} {:>9} {:>9.2e}   {:>13.6e}",
                record.id,
                path,
                conv.iterations,
                conv.norm_rr,
                l,
                ctan_iter,
                ctan_norm,
                conv.i_reached_aux
            );
        }
    }

    /// Homogenizes a single Gauss point
    fn homogenize_one(&mut self, id: usize, strain: &[f64], with_tangent: bool) -> Result<(), StrError> {
        let criterion = self
            .criterion
            .as_mut()
            .ok_or("the reference stiffness is not calibrated; call calibrate first")?;
        if self.registry.upsert(id, strain)? {
            log::debug!("allocated Gauss point {}", id);
        }
        let record = self.registry.get_mut(id)?;
        homogenize_record(
            record,
            criterion,
            &mut self.solver,
            &mut self.vars_old,
            &self.config,
            with_tangent,
        )
    }
}

/// Homogenizes the stress and, optionally, the tangent of a Gauss point
fn homogenize_record<S: MicroSolver>(
    record: &mut GaussPointRecord,
    criterion: &mut LinearCriterion,
    solver: &mut S,
    vars_old: &mut Vector,
    config: &Config,
    with_tangent: bool,
) -> Result<(), StrError> {
    // load the committed internal values (zero if elastic)
    match record.regime.committed() {
        Some(committed) => {
            for i in 0..vars_old.dim() {
                vars_old[i] = committed[i];
            }
        }
        None => vars_old.fill(0.0),
    }

    // classify
    criterion.i_reached = record.convergence.i_reached;
    let linear = criterion.is_linear(&record.macro_strain)?;

    // fast path
    if linear && !record.regime.is_plastic() {
        let nvoi = record.nvoi();
        let sigma = criterion.trial_stress();
        let ctan = criterion.ctan_linear();
        for i in 0..nvoi {
            record.macro_stress[i] = sigma[i];
            for j in 0..nvoi {
                record.macro_ctan[i * nvoi + j] = ctan.get(i, j);
            }
        }
        record.convergence.reset_counters();
        record.convergence.i_reached_aux = criterion.i_reached;
        record.path = Some(HomogenizationPath::Linear);
        return Ok(());
    }

    // full path
    solver.set_internal_values(vars_old.as_data())?;
    solver.prescribe_strain(record.macro_strain.as_data())?;
    let report = solver.solve()?;
    let stress = solver.average_stress();
    for i in 0..record.nvoi() {
        record.macro_stress[i] = stress[i];
    }
    if report.nonlinear && record.regime.enter_plastic(vars_old.dim()) {
        log::debug!("Gauss point {} has left the elastic regime", record.id);
    }
    record.regime.stage(solver.internal_values())?;
    record.convergence.iterations = report.iterations;
    record.convergence.norm_rr = report.norm_rr;
    record.convergence.converged = report.converged;
    if !report.converged {
        log::warn!(
            "Gauss point {}: micro-scale solve did not converge after {} iterations; |R| = {:e}",
            record.id,
            report.iterations,
            report.norm_rr
        );
    }

    // tangent
    if with_tangent {
        calc_ctan_fd(
            &mut record.macro_ctan,
            &mut record.convergence,
            solver,
            vars_old.as_data(),
            &record.macro_strain,
            &record.macro_stress,
            config.delta_tangent,
            config.tol_filter_ctan,
        )?;
    } else {
        record.convergence.reset_ctan_counters();
    }
    record.convergence.i_reached_aux = criterion.i_reached;
    record.path = Some(HomogenizationPath::Nonlinear);
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Homogenizer;
    use crate::base::{Config, SampleParams};
    use crate::homogenization::{HomogenizationPath, I_REACHED_INI};
    use crate::micro::{CountingSolver, Laminate};
    use russell_lab::{approx_eq, vec_approx_eq, Vector};

    fn allocate(ndim: usize, inv_max: f64) -> Homogenizer<CountingSolver<Laminate>> {
        let mut config = Config::new(ndim);
        config.inv_max = inv_max;
        let param = SampleParams::param_bottom_layer();
        let solver = CountingSolver::new(Laminate::new(&config, &param).unwrap());
        Homogenizer::new(&config, solver).unwrap()
    }

    fn allocate_one_iteration() -> Homogenizer<CountingSolver<Laminate>> {
        let config = Config::new(3);
        let mut param = SampleParams::param_bottom_layer();
        param.n_max_iterations = 1;
        param.tol_rel_residual = 1e-30;
        let solver = CountingSolver::new(Laminate::new(&config, &param).unwrap());
        let mut hom = Homogenizer::new(&config, solver).unwrap();
        hom.calibrate().unwrap(); // only warns
        hom.solver_mut().reset();
        hom
    }

    #[test]
    fn new_captures_errors() {
        let config = Config::new(2);
        let param = SampleParams::param_bottom_layer();
        let solver = Laminate::new(&config, &param).unwrap();
        let mut wrong = Config::new(3);
        assert_eq!(
            Homogenizer::new(&wrong, solver).err(),
            Some("the number of Voigt components of the micro-solver is inconsistent with ndim")
        );
        wrong.inv_max = -1.0;
        let solver = Laminate::new(&config, &param).unwrap();
        assert_eq!(
            Homogenizer::new(&wrong, solver).err(),
            Some("cannot allocate homogenizer because config.validate() failed")
        );
    }

    #[test]
    fn uncalibrated_homogenizer_fails() {
        let mut hom = allocate(2, 0.01);
        assert_eq!(
            hom.get_ctan_linear().err(),
            Some("the reference stiffness is not calibrated; call calibrate first")
        );
        hom.set_macro_strain(1, &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(
            hom.localize_homogenize().err(),
            Some("the reference stiffness is not calibrated; call calibrate first")
        );
        assert_eq!(
            hom.homogenize_stress(1, &[0.0, 0.0, 0.0]).err(),
            Some("the reference stiffness is not calibrated; call calibrate first")
        );
        assert_eq!(
            hom.homogenize_ctan(1, &[0.0, 0.0, 0.0]).err(),
            Some("the reference stiffness is not calibrated; call calibrate first")
        );
        assert_eq!(hom.solver().n_solve(), 0);
    }

    #[test]
    fn calibrate_works() {
        let mut hom = allocate(2, 0.01);
        hom.calibrate().unwrap();
        assert_eq!(hom.solver().n_solve(), 3);
        assert_eq!(hom.calibrate().err(), Some("the reference stiffness is already calibrated"));
        let ctan = hom.get_ctan_linear().unwrap();
        assert_eq!(ctan.dims(), (3, 3));
        // symmetric and positive diagonal
        for i in 0..3 {
            assert!(ctan.get(i, i) > 0.0);
            for j in 0..3 {
                approx_eq(ctan.get(i, j), ctan.get(j, i), 1e-4);
            }
        }
    }

    #[test]
    fn getters_capture_errors() {
        let mut hom = allocate(3, 0.01);
        hom.calibrate().unwrap();
        assert_eq!(hom.get_macro_stress(9).err(), Some("cannot find Gauss point with the given id"));
        assert_eq!(hom.get_macro_ctan(9).err(), Some("cannot find Gauss point with the given id"));
        assert_eq!(
            hom.get_committed_internal_values(9).err(),
            Some("cannot find Gauss point with the given id")
        );
        assert_eq!(hom.get_trial_internal_values(9).err(), Some("cannot find Gauss point with the given id"));
        assert_eq!(hom.get_convergence(9).err(), Some("cannot find Gauss point with the given id"));
        assert_eq!(hom.get_path(9).err(), Some("cannot find Gauss point with the given id"));
        assert_eq!(
            hom.set_macro_strain(9, &[0.0]).err(),
            Some("strain vector must have nvoi components")
        );
    }

    #[test]
    fn fast_path_works() {
        let mut hom = allocate(2, 1e3);
        hom.calibrate().unwrap();
        hom.solver_mut().reset();
        let strain = [1e-5, -2e-5, 3e-5];
        hom.set_macro_strain(5, &strain).unwrap();
        assert_eq!(hom.get_path(5).unwrap(), None);
        hom.localize_homogenize().unwrap();
        assert_eq!(hom.solver().n_solve(), 0);
        assert_eq!(hom.get_path(5).unwrap(), Some(HomogenizationPath::Linear));

        let ctan = hom.get_ctan_linear().unwrap();
        let mut correct = vec![0.0; 3];
        for i in 0..3 {
            for j in 0..3 {
                correct[i] += ctan.get(i, j) * strain[j];
            }
        }
        vec_approx_eq(&Vector::from(&correct), &hom.get_macro_stress(5).unwrap().to_vec(), 1e-10);
        let macro_ctan = hom.get_macro_ctan(5).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(macro_ctan[i * 3 + j], ctan.get(i, j));
            }
        }
        let conv = hom.get_convergence(5).unwrap();
        assert_eq!(conv.iterations, 0);
        assert_eq!(conv.norm_rr, 0.0);
        assert_eq!(conv.i_reached, I_REACHED_INI);
        assert!(conv.i_reached_aux > 0.0);
        assert_eq!(hom.get_committed_internal_values(5).unwrap(), None);
    }

    #[test]
    fn full_path_works() {
        let mut hom = allocate(3, 0.01);
        hom.calibrate().unwrap();
        hom.solver_mut().reset();
        hom.set_macro_strain(1, &[0.0, 0.0, 0.5, 0.0, 0.0, 0.0]).unwrap();
        hom.localize_homogenize().unwrap();
        assert_eq!(hom.solver().n_solve(), 7);
        assert_eq!(hom.get_path(1).unwrap(), Some(HomogenizationPath::Nonlinear));
        let conv = hom.get_convergence(1).unwrap();
        assert_eq!(conv.all_converged(), true);
        assert!(conv.iterations > 0);

        // trial values are staged, committed values are zero
        let trial = hom.get_trial_internal_values(1).unwrap().unwrap().to_vec();
        assert!(trial[6] > 0.0);
        let committed = hom.get_committed_internal_values(1).unwrap().unwrap();
        assert!(committed.iter().all(|v| *v == 0.0));

        // commit
        hom.update_internal_variables();
        let committed = hom.get_committed_internal_values(1).unwrap().unwrap();
        assert_eq!(committed, trial.as_slice());
        let conv = hom.get_convergence(1).unwrap();
        assert_eq!(conv.i_reached, conv.i_reached_aux);
    }

    #[test]
    fn convenience_functions_work() {
        let mut hom = allocate(2, 0.01);
        hom.calibrate().unwrap();
        hom.solver_mut().reset();

        // new record, stress only
        let stress = hom.homogenize_stress(3, &[0.0, 0.01, 0.0]).unwrap().to_vec();
        assert_eq!(hom.solver().n_solve(), 1);
        assert!(stress[1] > 0.0);
        assert_eq!(hom.registry().len(), 1);

        // existing record, with tangent
        hom.solver_mut().reset();
        let ctan = hom.homogenize_ctan(3, &[0.0, 0.01, 0.0]).unwrap().to_vec();
        assert_eq!(hom.solver().n_solve(), 4);
        assert_eq!(ctan.len(), 9);
        assert!(ctan[4] > 0.0);
        vec_approx_eq(&Vector::from(&stress), &hom.get_macro_stress(3).unwrap().to_vec(), 1e-15);
    }

    #[test]
    fn without_tangent_keeps_the_previous_ctan() {
        let mut config = Config::new(2);
        config.with_tangent = false;
        config.verbose = true;
        let param = SampleParams::param_bottom_layer();
        let solver = CountingSolver::new(Laminate::new(&config, &param).unwrap());
        let mut hom = Homogenizer::new(&config, solver).unwrap();
        hom.calibrate().unwrap();
        hom.solver_mut().reset();
        hom.set_macro_strain(1, &[0.0, 0.01, 0.0]).unwrap();
        hom.localize_homogenize().unwrap();
        assert_eq!(hom.solver().n_solve(), 1);
        assert_eq!(hom.get_macro_ctan(1).unwrap(), &[0.0; 9]);
    }

    #[test]
    fn non_convergence_is_recorded() {
        let mut hom = allocate_one_iteration();
        hom.set_macro_strain(1, &[0.0, 0.0, 0.5, 0.0, 0.0, 0.0]).unwrap();
        hom.localize_homogenize().unwrap();
        assert_eq!(hom.solver().n_solve(), 7);
        assert_eq!(hom.get_path(1).unwrap(), Some(HomogenizationPath::Nonlinear));
        let conv = hom.get_convergence(1).unwrap();
        assert_eq!(conv.converged, false);
        assert_eq!(conv.iterations, 1);
        assert!(conv.norm_rr > 0.0);
        assert_eq!(conv.ctan_iterations, &[1, 1, 1, 1, 1, 1]);
        assert!(conv.ctan_converged.iter().any(|c| !*c));
        assert_eq!(conv.all_converged(), false);

        // the best-effort results are still stored
        assert!(hom.get_trial_internal_values(1).unwrap().is_some());
        assert!(hom.get_macro_stress(1).unwrap().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn stress_only_resets_the_ctan_diagnostics() {
        let mut hom = allocate_one_iteration();
        let strain = [0.0, 0.0, 0.5, 0.0, 0.0, 0.0];
        hom.homogenize_ctan(1, &strain).unwrap();
        let conv = hom.get_convergence(1).unwrap();
        assert!(conv.ctan_iterations.iter().all(|n| *n > 0));
        assert!(conv.ctan_converged.iter().any(|c| !*c));

        hom.solver_mut().reset();
        hom.homogenize_stress(1, &strain).unwrap();
        assert_eq!(hom.solver().n_solve(), 1);
        let conv = hom.get_convergence(1).unwrap();
        assert_eq!(conv.converged, false);
        assert_eq!(conv.ctan_iterations, &[0, 0, 0, 0, 0, 0]);
        assert_eq!(conv.ctan_norm_rr, &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(conv.ctan_converged, &[true, true, true, true, true, true]);
    }
}
