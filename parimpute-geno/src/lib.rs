//! parimpute-geno: Genotype and pedigree I/O for parimpute
//!
//! Provides the GenotypeReader trait, a memory-mapped PLINK bed/bim/fam
//! reader, and the pedigree parser that groups genotyped offspring into
//! sibships sharing one genotyped parent.

pub mod pedigree;
pub mod plink;
pub mod sample;
pub mod traits;

pub use pedigree::{PedigreeRow, ResolvedPedigree, Sibship};
pub use traits::{GenotypeReader, MarkerData, MarkerInfo};
