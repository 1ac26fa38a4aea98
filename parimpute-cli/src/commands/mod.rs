pub mod impute;
pub mod validate;
