pub mod adaptors;
pub mod registration;
pub mod uploads;
pub mod validate;
