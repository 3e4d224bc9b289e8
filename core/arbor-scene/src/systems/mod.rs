pub mod accuracy;
pub mod diff;
