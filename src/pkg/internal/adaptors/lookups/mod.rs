pub mod mutators;
