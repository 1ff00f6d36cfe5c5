//! One-dimensional derivative-free minimization.
//!
//! Brent's `localmin`: golden-section search combined with successive
//! parabolic interpolation. Used by the carbonate solver (pH from
//! alkalinity) and by the implicit DIC updates (DIC from a mass balance),
//! both of which minimize an absolute residual.

/// Golden-section ratio `(3 - sqrt(5)) / 2`.
const GOLDEN: f64 = 0.381_966_011_250_105_1;

/// Minimize `f` over `[lo, hi]` and return the abscissa of the minimum.
///
/// `f` is never evaluated closer than `sqrt(eps) * |x| + tol / 3` to the
/// current best point, so `tol` bounds the final bracket width. There is no
/// iteration cap and no error signal: a multimodal `f` yields some local
/// minimum inside the interval.
pub fn brent_fmin<F>(lo: f64, hi: f64, mut f: F, tol: f64) -> f64
where
    F: FnMut(f64) -> f64,
{
    let eps = f64::EPSILON.sqrt();
    let tol3 = tol / 3.0;

    let mut a = lo;
    let mut b = hi;
    let mut x = a + GOLDEN * (b - a);
    let mut w = x;
    let mut v = x;
    let mut d = 0.0_f64;
    let mut e = 0.0_f64;

    let mut fx = f(x);
    let mut fw = fx;
    let mut fv = fx;

    loop {
        let xm = (a + b) * 0.5;
        let tol1 = eps * x.abs() + tol3;
        let t2 = tol1 * 2.0;

        if (x - xm).abs() <= t2 - (b - a) * 0.5 {
            break;
        }

        let mut p = 0.0;
        let mut q = 0.0;
        let mut r = 0.0;

        if e.abs() > tol1 {
            // fit parabola through (v, fv), (w, fw), (x, fx)
            r = (x - w) * (fx - fv);
            q = (x - v) * (fx - fw);
            p = (x - v) * q - (x - w) * r;
            q = (q - r) * 2.0;
            if q > 0.0 {
                p = -p;
            } else {
                q = -q;
            }
            r = e;
            e = d;
        }

        if p.abs() >= (q * 0.5 * r).abs() || p <= q * (a - x) || p >= q * (b - x) {
            e = if x < xm { b - x } else { a - x };
            d = GOLDEN * e;
        } else {
            d = p / q;
            let u = x + d;
            // too close to an endpoint
            if u - a < t2 || b - u < t2 {
                d = if x < xm { tol1 } else { -tol1 };
            }
        }

        let u = if d.abs() >= tol1 {
            x + d
        } else if d > 0.0 {
            x + tol1
        } else {
            x - tol1
        };

        let fu = f(u);

        if fu <= fx {
            if u < x {
                b = x;
            } else {
                a = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    x
}

/// Find `x` in `[lo, hi]` where `f(x)` comes closest to `target`.
///
/// Minimizes `|target - f(x)|`; for a monotonic `f` that brackets the
/// target this is a root finder.
pub fn solve_for<F>(lo: f64, hi: f64, target: f64, mut f: F, tol: f64) -> f64
where
    F: FnMut(f64) -> f64,
{
    brent_fmin(lo, hi, |x| (target - f(x)).abs(), tol)
}

/// Worst-case distance between the returned abscissa and the true minimum.
pub fn accuracy(x: f64, tol: f64) -> f64 {
    3.0 * f64::EPSILON.sqrt() * x.abs() + tol
}
