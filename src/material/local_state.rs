use russell_lab::Vector;
use russell_tensor::{Mandel, Tensor2};
use std::fmt;

/// Holds the local state of a micro-scale phase
///
/// This data is associated with a single material point.
#[derive(Clone, Debug)]
pub struct LocalState {
    /// Holds the internal values Z
    ///
    /// On input to a stress update, these are the committed values; on output, the updated ones.
    pub internal_values: Vector,

    /// Holds the stress tensor σ
    pub stress: Tensor2,

    /// Holds the elastoplastic loading flag
    pub loading: bool,

    /// Holds the algorithmic lagrange multiplier (Λ)
    pub algo_lambda: f64,
}

impl LocalState {
    /// Allocates a new instance
    pub fn new(mandel: Mandel, n_internal_values: usize) -> Self {
        LocalState {
            internal_values: Vector::new(n_internal_values),
            stress: Tensor2::new(mandel),
            loading: false,
            algo_lambda: 0.0,
        }
    }

    /// Sets the internal values from a slice of committed values
    ///
    /// # Panics
    ///
    /// A panic will occur if the slice has a different length.
    pub fn set_internal_values(&mut self, values: &[f64]) {
        assert_eq!(values.len(), self.internal_values.dim());
        for i in 0..values.len() {
            self.internal_values[i] = values[i];
        }
    }
}

impl fmt::Display for LocalState {
    /// Returns a nicely formatted string representing the local state
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "σ = {:?}", self.stress.vector().as_data())?;
        write!(f, "\nz = {:?}", self.internal_values.as_data())?;
        write!(f, "\nloading = {}", self.loading)?;
        write!(f, "\nalgo_lambda = {:?}", self.algo_lambda)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::LocalState;
    use russell_tensor::Mandel;

    #[test]
    fn new_and_set_work() {
        let mut state = LocalState::new(Mandel::Symmetric2D, 2);
        assert_eq!(state.internal_values.dim(), 2);
        assert_eq!(state.stress.vector().dim(), 4);
        assert_eq!(state.loading, false);
        state.set_internal_values(&[1.0, 2.0]);
        assert_eq!(state.internal_values.as_data(), &[1.0, 2.0]);
        let clone = state.clone();
        assert_eq!(clone.internal_values.as_data(), &[1.0, 2.0]);
    }

    #[test]
    fn display_works() {
        let state = LocalState::new(Mandel::Symmetric2D, 1);
        assert_eq!(
            format!("{}", state),
            "σ = [0.0, 0.0, 0.0, 0.0]\n\
             z = [0.0]\n\
             loading = false\n\
             algo_lambda = 0.0"
        );
    }
}
