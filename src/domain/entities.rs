pub mod envelope;
pub mod experience;
pub mod listing;
