//! Closed-form posterior means of the missing parent's dosage.
//!
//! Each function is one arm of [`ImputationCase`](super::ImputationCase).
//! `k` is the number of informative siblings: those whose genotype reveals
//! which allele the missing parent transmitted. The textbook forms
//!
//! ```text
//! all_received_counted(k, f)  = (1 + f(2^k - 1)) / (1 + f(2^(k-1) - 1))
//! none_received_counted(k, f) = f / (2^(k-1) - f(2^(k-1) - 1))
//! ```
//!
//! are evaluated after scaling numerator and denominator by `2^(1-k)`, which
//! keeps large sibships finite. Every denominator is at least 1 on [0, 1],
//! so the boundary frequencies are handled as exact limits.

/// Missing parent carries the counted allele (dosage 1 or 2) and all `k`
/// informative siblings received it from that parent.
///
/// Increases from 1 at `f = 0` to 2 at `f = 1`.
pub fn all_received_counted(k: u32, f: f64) -> f64 {
    debug_assert!(k >= 1);
    if f <= 0.0 {
        return 1.0;
    }
    if f >= 1.0 {
        return 2.0;
    }
    let t = (1.0 - f64::from(k)).exp2() * (1.0 - f);
    (t + 2.0 * f) / (t + f)
}

/// Missing parent has dosage 0 or 1 and none of the `k` informative
/// siblings received the counted allele from it.
///
/// Increases from 0 at `f = 0` to 1 at `f = 1`.
pub fn none_received_counted(k: u32, f: f64) -> f64 {
    debug_assert!(k >= 1);
    if f <= 0.0 {
        return 0.0;
    }
    if f >= 1.0 {
        return 1.0;
    }
    let t = (1.0 - f64::from(k)).exp2();
    f * t / ((1.0 - f) + f * t)
}

/// Both alleles of the missing parent were seen among the siblings: it is
/// heterozygous with certainty.
pub fn both_transmitted() -> f64 {
    1.0
}

/// No sibling is informative; the posterior equals the prior mean.
pub fn uninformative(f: f64) -> f64 {
    2.0 * f
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textbook_all(n: i32, f: f64) -> f64 {
        (1.0 + f * (2f64.powi(n) - 1.0)) / (1.0 + f * (2f64.powi(n - 1) - 1.0))
    }

    fn textbook_none(n: i32, f: f64) -> f64 {
        f / (2f64.powi(n - 1) - f * (2f64.powi(n - 1) - 1.0))
    }

    #[test]
    fn test_scaled_forms_match_textbook() {
        for k in 1..=12 {
            for &f in &[0.01, 0.1, 0.25, 0.5, 0.73, 0.99] {
                let a = all_received_counted(k as u32, f);
                let b = none_received_counted(k as u32, f);
                assert!((a - textbook_all(k, f)).abs() < 1e-12, "k={} f={}", k, f);
                assert!((b - textbook_none(k, f)).abs() < 1e-12, "k={} f={}", k, f);
            }
        }
    }

    #[test]
    fn test_single_sibling_values() {
        // One informative sibling: 1 + f and f.
        assert!((all_received_counted(1, 0.3) - 1.3).abs() < 1e-12);
        assert!((none_received_counted(1, 0.3) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_limits() {
        for k in [1, 2, 5, 40] {
            assert_eq!(all_received_counted(k, 0.0), 1.0);
            assert_eq!(all_received_counted(k, 1.0), 2.0);
            assert_eq!(none_received_counted(k, 0.0), 0.0);
            assert_eq!(none_received_counted(k, 1.0), 1.0);
        }
        // The interior approaches the limits continuously.
        assert!((all_received_counted(3, 1e-12) - 1.0).abs() < 1e-9);
        assert!((none_received_counted(3, 1.0 - 1e-12) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_sibships_stay_finite() {
        let a = all_received_counted(5000, 0.2);
        let b = none_received_counted(5000, 0.2);
        assert!((a - 2.0).abs() < 1e-12);
        assert!(b.abs() < 1e-12);
        assert!(a.is_finite() && b.is_finite());
    }

    #[test]
    fn test_monotone_in_sibship_size() {
        // More siblings all receiving the allele push the estimate towards 2.
        let mut prev = all_received_counted(1, 0.4);
        for k in 2..20 {
            let cur = all_received_counted(k, 0.4);
            assert!(cur > prev);
            prev = cur;
        }
    }

    #[test]
    fn test_uninformative_is_prior_mean() {
        assert!((uninformative(0.3) - 0.6).abs() < 1e-15);
        assert_eq!(both_transmitted(), 1.0);
    }
}
