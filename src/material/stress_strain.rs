use super::{LinearElastic, LocalState, VonMises};
use crate::base::ParamStressStrain;
use crate::StrError;
use russell_tensor::{Tensor2, Tensor4};

/// Specifies the essential functions for (total-strain) stress-strain models
pub trait StressStrainTrait: Send {
    /// Returns the number of internal values
    fn n_internal_values(&self) -> usize;

    /// Computes the consistent tangent stiffness
    fn stiffness(&mut self, dd: &mut Tensor4, state: &LocalState) -> Result<(), StrError>;

    /// Updates the stress tensor given the total strain tensor
    ///
    /// On input, `state.internal_values` holds the committed internal values;
    /// on output, it holds the updated internal values.
    fn update_stress(&mut self, state: &mut LocalState, strain: &Tensor2) -> Result<(), StrError>;
}

/// Holds the actual stress-strain model implementation
pub struct StressStrain {
    /// Holds the actual model implementation
    pub actual: Box<dyn StressStrainTrait>,
}

impl StressStrain {
    /// Allocates a new instance
    ///
    /// **Note:** 2D means plane-strain.
    pub fn new(two_dim: bool, param: &ParamStressStrain) -> Result<Self, StrError> {
        let actual: Box<dyn StressStrainTrait> = match *param {
            ParamStressStrain::LinearElastic { young, poisson } => Box::new(LinearElastic::new(two_dim, young, poisson)),
            ParamStressStrain::VonMises { young, poisson, z0, hh } => {
                if z0 <= 0.0 {
                    return Err("z0 must be > 0.0 for the von Mises model");
                }
                if hh < 0.0 {
                    return Err("hh must be ≥ 0.0 for the von Mises model");
                }
                Box::new(VonMises::new(two_dim, young, poisson, z0, hh))
            }
        };
        Ok(StressStrain { actual })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
