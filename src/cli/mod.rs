pub mod reset;
pub mod status;
