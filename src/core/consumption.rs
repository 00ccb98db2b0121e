use serde::{Deserialize, Deserializer};

use crate::quantity::{KilowattHours, Pounds};

/// Single fuel consumption data point as reported by the myenergy GraphQL service.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[must_use]
pub struct ConsumptionRecord {
    /// Period start label, for example `2023-01-01`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub partial: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub estimated: Estimated,

    /// No data exists for this slot, energy and cost are meaningless.
    #[serde(default, deserialize_with = "null_as_default")]
    pub empty: bool,

    pub cost: Option<Pounds>,

    pub energy: Option<KilowattHours>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub fuel: Fuel,

    #[serde(default, rename = "daysWithData")]
    pub days_with_data: Option<u32>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Estimated {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cost: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub energy: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Fuel {
    #[display("gas")]
    Gas,

    #[display("electricity")]
    Electricity,

    /// Anything else the provider may come up with, including `null`.
    #[default]
    #[serde(other)]
    #[display("other")]
    Other,
}

/// Any field may come as `null` for empty slots.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
