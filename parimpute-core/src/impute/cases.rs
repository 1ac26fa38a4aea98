//! Case analysis of sibling genotype patterns.
//!
//! The posterior for the missing parent depends only on the genotyped
//! parent's class and on which sibling classes are present. Each
//! combination maps to one [`ImputationCase`]; the `match` in
//! [`ImputationCase::classify`] is checked for exhaustiveness by the compiler.

use super::formulas;
use super::{ImputeError, ImputedValue};
use crate::genotype::{GenotypeClass, GenotypeCounts};

/// Which closed form applies to a (parent class, sibling counts) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImputationCase {
    /// A sibling genotype the genotyped parent cannot have produced.
    Contradiction,
    /// The missing parent carries the counted allele and every one of the
    /// `informative` siblings received it.
    AllReceivedCounted { informative: u32 },
    /// The missing parent has at most one copy and none of the
    /// `informative` siblings received the counted allele from it.
    NoneReceivedCounted { informative: u32 },
    /// Both alleles of the missing parent were transmitted.
    BothTransmitted,
    /// Heterozygous parent with only heterozygous children.
    Uninformative,
}

impl ImputationCase {
    /// Dispatch on the parent class and the presence pattern of the three
    /// sibling classes.
    pub fn classify(parent: GenotypeClass, counts: GenotypeCounts) -> Result<Self, ImputeError> {
        use crate::genotype::GenotypeClass::{Het, HomAlt, HomRef};
        use crate::impute::ImputationCase::*;

        let n = counts.total();
        let present = (counts.hom_ref > 0, counts.het > 0, counts.hom_alt > 0);

        let case = match (parent, present) {
            (_, (false, false, false)) => return Err(ImputeError::EmptyFamily),

            // Every child of a homozygous parent carries that parent's allele.
            (HomAlt, (true, _, _)) | (HomRef, (_, _, true)) => Contradiction,

            // Homozygous counted-allele parent: hom-alt children got the
            // counted allele from the missing parent, hets got the other.
            (HomAlt, (false, false, true)) => AllReceivedCounted { informative: n },
            (HomAlt, (false, true, false)) => NoneReceivedCounted { informative: n },
            (HomAlt, (false, true, true)) => BothTransmitted,

            // Homozygous other-allele parent: hets got the counted allele
            // from the missing parent, hom-refs did not.
            (HomRef, (false, true, false)) => AllReceivedCounted { informative: n },
            (HomRef, (true, false, false)) => NoneReceivedCounted { informative: n },
            (HomRef, (true, true, false)) => BothTransmitted,

            // Heterozygous parent: only homozygous children are informative.
            (Het, (false, _, true)) => AllReceivedCounted {
                informative: counts.hom_alt,
            },
            (Het, (true, _, true)) => BothTransmitted,
            (Het, (true, _, false)) => NoneReceivedCounted {
                informative: counts.hom_ref,
            },
            (Het, (false, true, false)) => Uninformative,
        };
        Ok(case)
    }

    /// Posterior expected dosage of the missing parent at allele frequency `f`.
    ///
    /// `f` must already be validated to lie in [0, 1].
    pub fn estimate(self, f: f64) -> ImputedValue {
        let value = match self {
            ImputationCase::Contradiction => return ImputedValue::Undefined,
            ImputationCase::AllReceivedCounted { informative } => {
                formulas::all_received_counted(informative, f)
            }
            ImputationCase::NoneReceivedCounted { informative } => {
                formulas::none_received_counted(informative, f)
            }
            ImputationCase::BothTransmitted => formulas::both_transmitted(),
            ImputationCase::Uninformative => formulas::uninformative(f),
        };
        debug_assert!(
            (0.0..=2.0).contains(&value),
            "{:?} at f={} gave dosage {} outside [0, 2]",
            self,
            f,
            value
        );
        ImputedValue::Dosage(value)
    }
}
