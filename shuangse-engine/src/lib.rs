pub mod compare;
pub mod generator;
