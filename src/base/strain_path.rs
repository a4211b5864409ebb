use russell_lab::Vector;
use serde::{Deserialize, Serialize};

/// Holds a cyclic uniaxial strain path driven by a single Voigt component
///
/// The strain component is incremented by `delta` at every step; the direction of
/// loading is reversed at each step listed in `reversals`.
///
/// ```text
/// ε[c](t) = ε[c](t-1) + sign(t) δ    where   sign(t) = (-1)^(number of reversals ≤ t)
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrainPath {
    /// Index of the Voigt component being driven
    pub component: usize,

    /// Strain increment per step
    pub delta: f64,

    /// Number of steps
    pub n_steps: usize,

    /// Steps at which the loading direction is reversed (sorted)
    pub reversals: Vec<usize>,
}

impl StrainPath {
    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self, nvoi: usize) -> Option<String> {
        if self.component >= nvoi {
            return Some(format!(
                "component = {} is incorrect; it must be < nvoi = {}",
                self.component, nvoi
            ));
        }
        if self.n_steps < 1 {
            return Some("n_steps = 0 is incorrect; it must be ≥ 1".to_string());
        }
        if self.reversals.windows(2).any(|w| w[0] >= w[1]) {
            return Some("reversals must be sorted in strictly increasing order".to_string());
        }
        None // all good
    }

    /// Generates the sequence of macro strains (one per step)
    pub fn generate(&self, nvoi: usize) -> Vec<Vector> {
        let mut eps = Vector::new(nvoi);
        let mut res = Vec::with_capacity(self.n_steps);
        for t in 0..self.n_steps {
            let n_rev = self.reversals.iter().filter(|r| **r <= t).count();
            let sign = if n_rev % 2 == 0 { 1.0 } else { -1.0 };
            eps[self.component] += sign * self.delta;
            res.push(eps.clone());
        }
        res
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
