use crate::StrError;
use russell_lab::{Matrix, Vector};
use russell_tensor::{Tensor2, Tensor4};
use std::f64::consts::SQRT_2;

/// Maps the Voigt index to the Mandel index in 2D (plane-strain; the zz component is skipped)
const VOIGT_TO_MANDEL_2D: [usize; 3] = [0, 1, 3];

/// Maps the Voigt index to the Mandel index in 3D
const VOIGT_TO_MANDEL_3D: [usize; 6] = [0, 1, 2, 3, 4, 5];

/// Returns the number of Voigt components given the space dimension
///
/// # Results
///
/// * `2D`: 3 components `[xx, yy, xy]`
/// * `3D`: 6 components `[xx, yy, zz, xy, yz, xz]`
pub fn nvoi_from_ndim(ndim: usize) -> usize {
    if ndim == 2 {
        3
    } else {
        6
    }
}

/// Returns the Voigt-to-Mandel index map
fn voigt_to_mandel(nvoi: usize) -> &'static [usize] {
    if nvoi == 3 {
        &VOIGT_TO_MANDEL_2D
    } else {
        &VOIGT_TO_MANDEL_3D
    }
}

/// Returns the scaling applied to each Voigt component (1 for normal and 1/√2 for shear components)
#[inline]
fn shear_scale(nvoi: usize, i: usize) -> f64 {
    let ndiag = if nvoi == 3 { 2 } else { 3 };
    if i < ndiag {
        1.0
    } else {
        1.0 / SQRT_2
    }
}

/// Sets a strain tensor from its Voigt representation
///
/// The shear components in Voigt notation are engineering strains (γ = 2 ε_ij);
/// hence, the Mandel components are `γ / √2`. In 2D (plane-strain), `ε_zz = 0`.
pub fn strain_voigt_to_mandel(epsilon: &mut Tensor2, voigt: &[f64]) -> Result<(), StrError> {
    let nvoi = voigt.len();
    let expected = if nvoi == 3 { 4 } else { 6 };
    if nvoi != 3 && nvoi != 6 {
        return Err("the Voigt vector must have 3 or 6 components");
    }
    let vec = epsilon.vector_mut();
    if vec.dim() != expected {
        return Err("the Mandel representation is incompatible with the Voigt vector");
    }
    vec.fill(0.0);
    let map = voigt_to_mandel(nvoi);
    for i in 0..nvoi {
        vec[map[i]] = voigt[i] * shear_scale(nvoi, i);
    }
    Ok(())
}

/// Extracts the Voigt representation of a stress tensor
///
/// The shear components in Voigt notation are the tensor components σ_ij; hence `σ_ij = mandel / √2`.
pub fn stress_mandel_to_voigt(voigt: &mut Vector, sigma: &Tensor2) {
    let nvoi = voigt.dim();
    let map = voigt_to_mandel(nvoi);
    let vec = sigma.vector();
    for i in 0..nvoi {
        voigt[i] = vec[map[i]] * shear_scale(nvoi, i);
    }
}

/// Extracts the Voigt representation of a (stress-strain) modulus
///
/// The resulting matrix `C` satisfies `σ_voigt = C · ε_voigt` with engineering shear strains.
pub fn modulus_mandel_to_voigt(ctan: &mut Matrix, dd: &Tensor4) {
    let (nvoi, _) = ctan.dims();
    let map = voigt_to_mandel(nvoi);
    let mat = dd.matrix();
    for i in 0..nvoi {
        for j in 0..nvoi {
            let s = shear_scale(nvoi, i) * shear_scale(nvoi, j);
            ctan.set(i, j, mat.get(map[i], map[j]) * s);
        }
    }
}

/// Calculates the first invariant of a tensor in Voigt notation
///
/// ```text
/// I1 = σxx + σyy (+ σzz)
/// ```
pub fn invariant_i1(ndim: usize, voigt: &Vector) -> f64 {
    if ndim == 2 {
        voigt[0] + voigt[1]
    } else {
        voigt[0] + voigt[1] + voigt[2]
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
