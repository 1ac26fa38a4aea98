//! Simulation-based validation of the imputation formulas.
//!
//! Families are drawn under the same transmission model the formulas
//! assume. Hiding one parent and imputing it from the other parent and the
//! children should, averaged over families that receive the same imputed
//! value, recover that value up to sampling error.

pub mod family;
pub mod validate;

pub use family::{simulate_family, SimulatedFamily};
pub use validate::{validate_imputation, ValidationConfig, ValidationGroup, ValidationReport};
