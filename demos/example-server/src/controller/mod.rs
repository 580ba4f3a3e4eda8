pub mod index;
pub mod notes;
