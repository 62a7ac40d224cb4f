/// Small numeric helpers shared by the builders and the rasterizer
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Clamp `v` into `[lo, hi]`.
pub fn clamp(lo: f32, hi: f32, v: f32) -> f32 {
    lo.max(hi.min(v))
}

pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees.to_radians()
}

/// Real roots of `a·x² + b·x + c = 0`, smaller root first.
///
/// Uses the `q = -(b ± sqrt(disc)) / 2` form so that neither root suffers
/// cancellation when `b² ≫ 4ac`. Returns `None` when there is no real root or
/// `a` is zero.
pub fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a == 0.0 {
        return None;
    }
    let discr = b * b - 4.0 * a * c;
    if discr < 0.0 {
        return None;
    }
    if discr == 0.0 {
        let x = -0.5 * b / a;
        return Some((x, x));
    }

    let q = if b > 0.0 {
        -0.5 * (b + discr.sqrt())
    } else {
        -0.5 * (b - discr.sqrt())
    };
    let x0 = q / a;
    let x1 = c / q;
    if x0 > x1 {
        Some((x1, x0))
    } else {
        Some((x0, x1))
    }
}

/// Uniform float generator owned by whoever needs randomness.
pub struct RandomFloat {
    rng: StdRng,
}

impl RandomFloat {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Next sample in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Next sample in `[lo, hi)`.
    pub fn next_in(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.0, 255.0, 300.0), 255.0);
        assert_eq!(clamp(0.0, 255.0, -3.0), 0.0);
        assert_eq!(clamp(0.0, 255.0, 17.5), 17.5);
    }

    #[test]
    fn test_solve_quadratic_two_roots() {
        // (x - 1)(x - 3)
        let (x0, x1) = solve_quadratic(1.0, -4.0, 3.0).unwrap();
        assert!((x0 - 1.0).abs() < 1e-6);
        assert!((x1 - 3.0).abs() < 1e-6);

        // negative leading coefficient still orders the roots
        let (x0, x1) = solve_quadratic(-2.0, 0.0, 8.0).unwrap();
        assert!((x0 + 2.0).abs() < 1e-6);
        assert!((x1 - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_solve_quadratic_degenerate_cases() {
        let (x0, x1) = solve_quadratic(1.0, 2.0, 1.0).unwrap();
        assert_eq!(x0, -1.0);
        assert_eq!(x1, -1.0);
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_none());
        assert!(solve_quadratic(0.0, 1.0, 1.0).is_none());
    }

    #[test]
    fn test_random_float_is_seeded_and_bounded() {
        let mut a = RandomFloat::from_seed(42);
        let mut b = RandomFloat::from_seed(42);
        for _ in 0..100 {
            let x = a.next_f32();
            assert_eq!(x, b.next_f32());
            assert!((0.0..1.0).contains(&x));
        }
        let y = a.next_in(-2.0, 2.0);
        assert!((-2.0..2.0).contains(&y));
    }
}
