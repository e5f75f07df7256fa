pub mod completions;
pub mod face;
pub mod roll;
