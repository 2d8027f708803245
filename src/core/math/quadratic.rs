//! Real roots of a*t^2 + b*t + c = 0 for the surface intersection solvers.

use crate::core::Float;

/// The real solutions of a degenerate or full quadratic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Roots {
    /// `a == 0`: the single root of the linear equation b*t + c = 0.
    Linear(Float),
    /// Both roots of the full quadratic. `plus` is the root with the
    /// positive branch of the square root in its numerator, i.e.
    /// (-b + sqrt(disc)) / (2a); `minus` is the other.
    Pair { plus: Float, minus: Float },
}

/// Solves a*t^2 + b*t + c = 0 over the reals.
///
/// Returns `None` when no real root exists: a negative discriminant, or the
/// fully degenerate case `a == b == 0`.
///
/// The quadratic branch avoids catastrophic cancellation by computing the
/// large-magnitude root first and recovering the other from the product of
/// roots (c/a = r1*r2).
pub(crate) fn solve(a: Float, b: Float, c: Float) -> Option<Roots> {
    if a == 0.0 {
        if b == 0.0 {
            return None;
        }
        return Some(Roots::Linear(-c / b));
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    // signum never returns zero for f64.
    let u = -(b + b.signum() * discriminant.sqrt()) / 2.0;

    if u == 0.0 {
        // b == 0 and discriminant == 0: both roots are zero.
        return Some(Roots::Pair {
            plus: 0.0,
            minus: 0.0,
        });
    }

    // signum(0.0) is +1, so for b >= 0 the large-magnitude root u carries
    // the negative branch and c/u recovers the positive one.
    let (plus, minus) = if b >= 0.0 { (c / u, u / a) } else { (u / a, c / u) };
    Some(Roots::Pair { plus, minus })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_simple_pair() {
        // (t - 1)(t - 3) = t^2 - 4t + 3
        let roots = solve(1.0, -4.0, 3.0).unwrap();
        assert_eq!(
            roots,
            Roots::Pair {
                plus: 3.0,
                minus: 1.0
            }
        );
    }

    #[test]
    fn test_plus_root_matches_textbook_branch() {
        // 2t^2 + 3t - 2 = 0 has roots 1/2 and -2; the (+) branch is 1/2.
        let roots = solve(2.0, 3.0, -2.0).unwrap();
        assert_eq!(
            roots,
            Roots::Pair {
                plus: 0.5,
                minus: -2.0
            }
        );
    }

    #[test]
    fn test_negative_discriminant() {
        assert_eq!(solve(1.0, 0.0, 1.0), None);
    }

    #[test]
    fn test_linear_fallback() {
        assert_eq!(solve(0.0, 2.0, -6.0), Some(Roots::Linear(3.0)));
    }

    #[test]
    fn test_fully_degenerate() {
        assert_eq!(solve(0.0, 0.0, 1.0), None);
    }

    #[test]
    fn test_cancellation_prone_coefficients() {
        // b^2 >> 4ac; the naive formula loses the small root entirely.
        let (a, b, c) = (1.0, -1.0e8, 1.0);
        if let Roots::Pair { plus, minus } = solve(a, b, c).unwrap() {
            let small = plus.min(minus);
            assert!((small - 1.0e-8).abs() / 1.0e-8 < 1e-12);
        } else {
            panic!("expected a pair of roots");
        }
    }
}
