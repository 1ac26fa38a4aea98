//! Genotype classes and the sibling count statistic.

use std::fmt;

use crate::impute::ImputeError;

/// Diploid genotype at a bi-allelic marker, as a count of the counted allele.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum GenotypeClass {
    HomRef = 0,
    Het = 1,
    HomAlt = 2,
}

impl GenotypeClass {
    pub const ALL: [GenotypeClass; 3] = [Self::HomRef, Self::Het, Self::HomAlt];

    /// Dosage of the counted allele.
    pub fn dosage(self) -> u8 {
        self as u8
    }

    /// The same genotype with the two allele states swapped.
    pub fn flipped(self) -> Self {
        match self {
            Self::HomRef => Self::HomAlt,
            Self::Het => Self::Het,
            Self::HomAlt => Self::HomRef,
        }
    }

    /// Convert a hard-call dosage. Only exactly 0.0, 1.0 or 2.0 are accepted.
    pub fn from_dosage(d: f64) -> Result<Self, ImputeError> {
        if d == 0.0 {
            Ok(Self::HomRef)
        } else if d == 1.0 {
            Ok(Self::Het)
        } else if d == 2.0 {
            Ok(Self::HomAlt)
        } else {
            Err(ImputeError::InvalidDosage(d))
        }
    }
}

impl TryFrom<u8> for GenotypeClass {
    type Error = ImputeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::HomRef),
            1 => Ok(Self::Het),
            2 => Ok(Self::HomAlt),
            _ => Err(ImputeError::InvalidGenotype(i64::from(v))),
        }
    }
}

impl TryFrom<i64> for GenotypeClass {
    type Error = ImputeError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        u8::try_from(v)
            .map_err(|_| ImputeError::InvalidGenotype(v))
            .and_then(<Self as TryFrom<u8>>::try_from)
    }
}

impl From<GenotypeClass> for f64 {
    fn from(g: GenotypeClass) -> f64 {
        f64::from(g.dosage())
    }
}

impl fmt::Display for GenotypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dosage())
    }
}

/// Counts of each genotype class among a set of siblings.
///
/// Siblings are exchangeable under the transmission model, so this triple
/// is all the imputation conditions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GenotypeCounts {
    pub hom_ref: u32,
    pub het: u32,
    pub hom_alt: u32,
}

impl GenotypeCounts {
    pub fn new(hom_ref: u32, het: u32, hom_alt: u32) -> Self {
        Self { hom_ref, het, hom_alt }
    }

    pub fn from_genotypes(genotypes: &[GenotypeClass]) -> Self {
        genotypes.iter().fold(Self::default(), |mut c, &g| {
            c.add(g);
            c
        })
    }

    pub fn add(&mut self, g: GenotypeClass) {
        match g {
            GenotypeClass::HomRef => self.hom_ref += 1,
            GenotypeClass::Het => self.het += 1,
            GenotypeClass::HomAlt => self.hom_alt += 1,
        }
    }

    /// Number of siblings.
    pub fn total(&self) -> u32 {
        self.hom_ref + self.het + self.hom_alt
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Counts after swapping the two allele states.
    pub fn flipped(&self) -> Self {
        Self::new(self.hom_alt, self.het, self.hom_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(GenotypeClass::try_from(2u8).unwrap(), GenotypeClass::HomAlt);
        assert_eq!(GenotypeClass::try_from(0i64).unwrap(), GenotypeClass::HomRef);
        assert!(matches!(
            GenotypeClass::try_from(3u8),
            Err(ImputeError::InvalidGenotype(3))
        ));
        assert!(matches!(
            GenotypeClass::try_from(-1i64),
            Err(ImputeError::InvalidGenotype(-1))
        ));
        assert_eq!(GenotypeClass::from_dosage(1.0).unwrap(), GenotypeClass::Het);
        assert!(GenotypeClass::from_dosage(0.5).is_err());
        assert!(GenotypeClass::from_dosage(f64::NAN).is_err());
        assert_eq!(f64::from(GenotypeClass::HomAlt), 2.0);
    }

    #[test]
    fn test_counts() {
        use crate::genotype::GenotypeClass::*;
        let c = GenotypeCounts::from_genotypes(&[Het, HomAlt, Het, HomRef, Het]);
        assert_eq!(c, GenotypeCounts::new(1, 3, 1));
        assert_eq!(c.total(), 5);
        assert_eq!(c.flipped(), GenotypeCounts::new(1, 3, 1));
        assert_eq!(GenotypeCounts::new(2, 0, 1).flipped(), GenotypeCounts::new(1, 0, 2));
        assert!(GenotypeCounts::default().is_empty());
    }
}
