use super::{ParamLaminate, ParamLayer, ParamStressStrain};

/// Holds samples of material parameters
pub struct SampleParams {}

impl SampleParams {
    /// Returns sample parameters for a linear elastic phase
    pub fn param_linear_elastic() -> ParamStressStrain {
        ParamStressStrain::LinearElastic {
            young: 1.0e6,
            poisson: 0.3,
        }
    }

    /// Returns sample parameters for a von Mises (elastoplastic) phase
    pub fn param_von_mises() -> ParamStressStrain {
        ParamStressStrain::VonMises {
            young: 1.0e6,
            poisson: 0.3,
            z0: 5.0e4,
            hh: 5.0e4,
        }
    }

    /// Returns a homogeneous (single-layer) linear elastic microstructure
    pub fn param_homogeneous_elastic() -> ParamLaminate {
        ParamLaminate::new(&[ParamLayer {
            fraction: 1.0,
            stress_strain: SampleParams::param_linear_elastic(),
        }])
    }

    /// Returns a homogeneous (single-layer) von Mises microstructure
    pub fn param_homogeneous_von_mises() -> ParamLaminate {
        ParamLaminate::new(&[ParamLayer {
            fraction: 1.0,
            stress_strain: SampleParams::param_von_mises(),
        }])
    }

    /// Returns a two-phase microstructure: a stiff elastic bottom layer and an elastoplastic matrix
    ///
    /// ```text
    ///   y ↑
    ///     ┌───────────────┐
    ///     │               │
    ///     │    matrix     │  von Mises, E = 1e6, ν = 0.3, z0 = 5e4, H = 5e4
    ///     │    (0.9)      │
    ///     ├───────────────┤
    ///     │  layer (0.1)  │  linear elastic, E = 3e6, ν = 0.3
    ///     └───────────────┘ → x
    /// ```
    pub fn param_bottom_layer() -> ParamLaminate {
        ParamLaminate::new(&[
            ParamLayer {
                fraction: 0.1,
                stress_strain: ParamStressStrain::LinearElastic {
                    young: 3.0e6,
                    poisson: 0.3,
                },
            },
            ParamLayer {
                fraction: 0.9,
                stress_strain: SampleParams::param_von_mises(),
            },
        ])
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::SampleParams;

    #[test]
    fn sample_params_are_valid() {
        assert_eq!(SampleParams::param_homogeneous_elastic().validate(), None);
        assert_eq!(SampleParams::param_homogeneous_von_mises().validate(), None);
        assert_eq!(SampleParams::param_bottom_layer().validate(), None);
        assert_eq!(SampleParams::param_bottom_layer().young_max(), 3.0e6);
    }
}
