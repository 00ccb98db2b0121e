use std::fmt::{Display, Formatter};

quantity!(Pounds, f64, "GBP");

impl Display for Pounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "£{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Pounds(3.2).to_string(), "£3.20");
        assert_eq!(format!("{:?}", Pounds(3.2)), "3.2GBP");
    }

    #[test]
    fn test_sum() {
        let total: Pounds = [Pounds(1.25), Pounds(2.5)].into_iter().sum();
        approx::assert_abs_diff_eq!(total.0, 3.75);
    }
}
