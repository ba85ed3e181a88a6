use ndarray::{Array, ArrayBase, Data, Dimension};
use num_traits::Float;

/// Modulus of `dividend` against `divisor`, always in `[0, divisor)`.
///
/// Computed by repeated subtraction/addition of `divisor` so values sitting
/// exactly on a boundary come out as the boundary itself (`360 % 360 == 0`,
/// `-0.0` is left alone) instead of the rounding artefacts a single remainder
/// can produce.
///
/// `divisor` must be positive and `dividend` finite; the loop does not
/// terminate otherwise.
pub fn pmod<T>(dividend: T, divisor: T) -> T
where
    T: Float,
{
    let mut x = dividend;
    while x >= divisor {
        x = x - divisor;
    }
    while x < T::zero() {
        x = x + divisor;
    }
    x
}

/// Element-wise [`pmod`] with a scalar divisor.
pub fn pmod_array<S, D>(dividend: &ArrayBase<S, D>, divisor: f64) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    dividend.mapv(|x| pmod(x, divisor))
}

/// Wrap a longitude in degrees into `[-180, 180)`.
pub fn wrap_lon_deg(lon: f64) -> f64 {
    pmod(lon + 180.0, 360.0) - 180.0
}
