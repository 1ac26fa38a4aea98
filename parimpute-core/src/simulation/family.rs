//! Random nuclear families under Mendelian transmission.

use rand::Rng;

use crate::genotype::GenotypeClass;

/// Two parents and their children at one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedFamily {
    pub parent_a: GenotypeClass,
    pub parent_b: GenotypeClass,
    pub siblings: Vec<GenotypeClass>,
}

/// Draw both parents as two independent Bernoulli(`f`) alleles each, then
/// `n` children taking one uniformly chosen allele from each parent.
///
/// # Panics
/// If `n == 0` or `f` is outside [0, 1].
pub fn simulate_family<R: Rng + ?Sized>(n: usize, f: f64, rng: &mut R) -> SimulatedFamily {
    assert!(n >= 1, "a family needs at least one child");
    assert!((0.0..=1.0).contains(&f), "allele frequency {} outside [0, 1]", f);

    let a = [rng.gen_bool(f), rng.gen_bool(f)];
    let b = [rng.gen_bool(f), rng.gen_bool(f)];

    let siblings = (0..n)
        .map(|_| {
            let from_a = a[rng.gen_range(0..2)];
            let from_b = b[rng.gen_range(0..2)];
            allele_sum(from_a, from_b)
        })
        .collect();

    SimulatedFamily {
        parent_a: allele_sum(a[0], a[1]),
        parent_b: allele_sum(b[0], b[1]),
        siblings,
    }
}

fn allele_sum(x: bool, y: bool) -> GenotypeClass {
    match (x, y) {
        (false, false) => GenotypeClass::HomRef,
        (true, true) => GenotypeClass::HomAlt,
        _ => GenotypeClass::Het,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_children_are_mendelian() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        for _ in 0..2000 {
            let fam = simulate_family(4, 0.4, &mut rng);
            assert_eq!(fam.siblings.len(), 4);
            let (a, b) = (fam.parent_a.dosage(), fam.parent_b.dosage());
            for s in &fam.siblings {
                let d = s.dosage();
                // Each parent contributes 0 or 1 copies, bounded by its own dosage.
                let lo = u8::from(a == 2) + u8::from(b == 2);
                let hi = u8::from(a > 0) + u8::from(b > 0);
                assert!(d >= lo && d <= hi, "parents {} {} child {}", a, b, d);
            }
        }
    }

    #[test]
    fn test_parent_frequency_matches_prior() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
        let n_rep = 20_000;
        let f = 0.3;
        let total: u32 = (0..n_rep)
            .map(|_| u32::from(simulate_family(1, f, &mut rng).parent_b.dosage()))
            .sum();
        let mean = f64::from(total) / n_rep as f64;
        // sd of the mean is sqrt(2 f (1 - f) / n) ~ 0.0046
        assert!((mean - 2.0 * f).abs() < 0.025, "mean dosage {}", mean);
    }

    #[test]
    fn test_monomorphic_frequencies() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        let fam = simulate_family(3, 0.0, &mut rng);
        assert_eq!(fam.parent_a, GenotypeClass::HomRef);
        assert!(fam.siblings.iter().all(|&s| s == GenotypeClass::HomRef));
        let fam = simulate_family(3, 1.0, &mut rng);
        assert_eq!(fam.parent_b, GenotypeClass::HomAlt);
        assert!(fam.siblings.iter().all(|&s| s == GenotypeClass::HomAlt));
    }

    #[test]
    #[should_panic]
    fn test_zero_children_panics() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
        simulate_family(0, 0.5, &mut rng);
    }
}
