//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Clamp a value between a minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Apply a symmetric deadband around zero to a value.
///
/// Values with a magnitude below `band` are treated as exactly zero. Values
/// outside the band are rescaled so that the output remains continuous and
/// still reaches full scale at an input of one.
pub fn apply_deadband<T>(value: T, band: T) -> T
where
    T: Float
{
    if value.abs() > band {
        (value - band * value.signum()) / (T::from(1.0).unwrap() - band)
    }
    else {
        T::from(0.0).unwrap()
    }
}

/// Wrap an angle in radians into the range (-pi, pi].
///
/// An input of exactly -pi is mapped to +pi, so the open end of the range is
/// respected.
pub fn wrap_to_pi<T>(angle: T) -> T
where
    T: Float + std::ops::Rem
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    pi_t - rem_euclid(pi_t - angle, tau_t)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float + std::ops::Rem
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 1f64), -1f64), 0f64);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 1f64), 1f64), 1f64);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 1f64), 0f64), 0.5f64);
    }

    #[test]
    fn test_apply_deadband() {
        assert_eq!(apply_deadband(0.05f64, 0.1), 0.0);
        assert_eq!(apply_deadband(-0.0999f64, 0.1), 0.0);
        assert!((apply_deadband(1.0f64, 0.1) - 1.0).abs() < 1e-12);
        assert!((apply_deadband(-1.0f64, 0.1) + 1.0).abs() < 1e-12);
        assert!((apply_deadband(0.55f64, 0.1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_to_pi() {
        assert!((wrap_to_pi(0f64)).abs() < 1e-12);
        assert!((wrap_to_pi(PI) - PI).abs() < 1e-12);
        assert!((wrap_to_pi(-PI) - PI).abs() < 1e-12);
        assert!((wrap_to_pi(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_to_pi(PI + 0.1) - (-PI + 0.1)).abs() < 1e-12);
        assert!((wrap_to_pi(-PI - 0.1) - (PI - 0.1)).abs() < 1e-12);
    }
}
