use std::{io::Write, path::Path};

use serde::{Serialize, Serializer};

use crate::{
    core::consumption::{ConsumptionRecord, Fuel},
    prelude::*,
    quantity::{KilowattHours, Pounds},
};

pub const GAS_FILENAME: &str = "myenergy_gas.csv";

pub const ELECTRICITY_FILENAME: &str = "myenergy_electricity.csv";

/// Non-empty records split by fuel.
#[derive(Default)]
#[must_use]
pub struct FuelHistories {
    pub gas: Vec<ConsumptionRecord>,
    pub electricity: Vec<ConsumptionRecord>,

    /// Non-empty records of any other fuel, which do not make it into the files.
    pub n_other: usize,
}

impl FuelHistories {
    pub fn from_records(records: impl IntoIterator<Item = ConsumptionRecord>) -> Self {
        let mut this = Self::default();
        for record in records.into_iter().filter(|record| !record.empty) {
            match record.fuel {
                Fuel::Gas => this.gas.push(record),
                Fuel::Electricity => this.electricity.push(record),
                Fuel::Other => this.n_other += 1,
            }
        }
        if this.n_other != 0 {
            warn!(n_records = this.n_other, "dropped records of unsupported fuels");
        }
        this
    }
}

#[derive(Serialize)]
struct Row<'a> {
    #[serde(rename = "Date")]
    date: &'a str,

    #[serde(rename = "Energy (kWh)")]
    energy: Option<KilowattHours>,

    #[serde(rename = "Cost (GBP)")]
    cost: Option<Pounds>,

    #[serde(rename = "Is partial?", serialize_with = "serialize_bool")]
    is_partial: bool,

    #[serde(rename = "Is energy estimated?", serialize_with = "serialize_bool")]
    is_energy_estimated: bool,

    #[serde(rename = "Is cost estimated?", serialize_with = "serialize_bool")]
    is_cost_estimated: bool,
}

impl<'a> From<&'a ConsumptionRecord> for Row<'a> {
    fn from(record: &'a ConsumptionRecord) -> Self {
        Self {
            date: &record.from,
            energy: record.energy,
            cost: record.cost,
            is_partial: record.partial,
            is_energy_estimated: record.estimated.energy,
            is_cost_estimated: record.estimated.cost,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_bool<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// Write the records as CSV, header included.
pub fn write_csv<'a, W: Write>(
    writer: W,
    records: impl IntoIterator<Item = &'a ConsumptionRecord>,
) -> Result {
    let mut writer = csv::Writer::from_writer(writer);
    let mut n_rows = 0_usize;
    for record in records {
        writer.serialize(Row::from(record))?;
        n_rows += 1;
    }
    if n_rows == 0 {
        // Serde-driven headers are only written along with the first row:
        writer.write_record(HEADER)?;
    }
    writer.flush()?;
    Ok(())
}

const HEADER: [&str; 6] = [
    "Date",
    "Energy (kWh)",
    "Cost (GBP)",
    "Is partial?",
    "Is energy estimated?",
    "Is cost estimated?",
];

#[instrument(skip_all, fields(path = %path.display(), n_records = records.len()))]
pub fn save_csv(path: &Path, records: &[ConsumptionRecord]) -> Result {
    info!("creating…");
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create `{}`", path.display()))?;
    write_csv(file, records).with_context(|| format!("failed to write `{}`", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::consumption::Estimated;

    fn record(from: &str, fuel: Fuel, empty: bool) -> ConsumptionRecord {
        ConsumptionRecord {
            from: from.to_owned(),
            partial: false,
            estimated: Estimated { energy: false, cost: true },
            empty,
            cost: Some(Pounds(3.2)),
            energy: Some(KilowattHours(12.5)),
            fuel,
            days_with_data: Some(1),
        }
    }

    fn to_csv(records: &[ConsumptionRecord]) -> Result<String> {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, records)?;
        Ok(String::from_utf8(buffer)?)
    }

    #[test]
    fn test_partition() {
        let histories = FuelHistories::from_records([
            record("2023-01-01", Fuel::Gas, false),
            record("2023-01-01", Fuel::Electricity, false),
            record("2023-01-02", Fuel::Gas, true),
            record("2023-01-02", Fuel::Electricity, true),
            record("2023-01-02", Fuel::Other, false),
            record("2023-01-03", Fuel::Gas, false),
        ]);
        assert_eq!(histories.gas.len(), 2);
        assert!(histories.gas.iter().all(|record| record.fuel == Fuel::Gas && !record.empty));
        assert_eq!(histories.electricity.len(), 1);
        assert!(histories.electricity.iter().all(|record| record.fuel == Fuel::Electricity));
        assert!(!histories.electricity[0].empty);
        assert_eq!(histories.n_other, 1);
    }

    #[test]
    fn test_partition_keeps_order() {
        let histories = FuelHistories::from_records([
            record("2023-01-01", Fuel::Gas, false),
            record("2023-01-02", Fuel::Gas, false),
            record("2023-01-03", Fuel::Gas, false),
        ]);
        let dates: Vec<_> = histories.gas.iter().map(|record| record.from.as_str()).collect();
        assert_eq!(dates, ["2023-01-01", "2023-01-02", "2023-01-03"]);
    }

    #[test]
    fn test_write_csv_comma_separated() -> Result {
        // Plain comma delimiter, no padding after the separators:
        let csv = to_csv(&[record("2023-01-01", Fuel::Gas, false)])?;
        assert_eq!(
            csv,
            "Date,Energy (kWh),Cost (GBP),Is partial?,Is energy estimated?,Is cost estimated?\n\
             2023-01-01,12.5,3.2,False,False,True\n",
        );
        Ok(())
    }

    #[test]
    fn test_write_csv_whole_numbers_and_nulls() -> Result {
        let mut record = record("2023-01-01", Fuel::Gas, false);
        record.energy = Some(KilowattHours(3.0));
        record.cost = None;
        record.partial = true;
        let csv = to_csv(&[record])?;
        assert!(csv.ends_with("2023-01-01,3.0,,True,False,True\n"), "{csv}");
        Ok(())
    }

    #[test]
    fn test_write_csv_empty() -> Result {
        let csv = to_csv(&[])?;
        assert_eq!(
            csv,
            "Date,Energy (kWh),Cost (GBP),Is partial?,Is energy estimated?,Is cost estimated?\n",
        );
        Ok(())
    }

    #[test]
    fn test_save_csv() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join(GAS_FILENAME);
        save_csv(&path, &[record("2023-01-01", Fuel::Gas, false)])?;
        assert_eq!(std::fs::read_to_string(&path)?.lines().count(), 2);
        Ok(())
    }
}
