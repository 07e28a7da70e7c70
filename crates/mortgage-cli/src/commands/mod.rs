pub mod calculate;
pub mod compare;
pub mod scenarios;
pub mod validate;
