pub mod consumption;
pub mod history;
pub mod window;
