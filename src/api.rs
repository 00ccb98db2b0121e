pub mod browser;
pub mod myenergy;
