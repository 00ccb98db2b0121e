use std::fmt::{Display, Formatter};

quantity!(KilowattHours, f64, "kWh");

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} kWh", self.0)
    }
}
