#[macro_use]
mod macros;

mod cost;
mod energy;

pub use self::{cost::Pounds, energy::KilowattHours};
