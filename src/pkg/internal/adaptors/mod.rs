pub mod lookups;
pub mod registrations;
