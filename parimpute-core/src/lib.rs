//! parimpute-core: Imputation of ungenotyped parents from genotyped sibships
//!
//! Given the genotypes of full siblings at a bi-allelic marker, the
//! genotype of their one genotyped parent, and the population allele
//! frequency, computes the posterior expected dosage of the missing parent
//! under Mendelian transmission with a Hardy-Weinberg prior.

pub mod genotype;
pub mod impute;
pub mod output;
pub mod pipeline;
pub mod simulation;

pub use genotype::{GenotypeClass, GenotypeCounts};
pub use impute::{impute, ImputationCase, ImputeError, ImputedValue};
