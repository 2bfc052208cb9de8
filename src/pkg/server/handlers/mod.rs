pub mod probes;
pub mod registration;
