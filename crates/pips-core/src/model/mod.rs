pub mod face;
pub mod history;
pub mod stats;
