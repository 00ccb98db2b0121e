use serde::Serialize;

use crate::core::window::Window;

/// GraphQL request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[must_use]
pub struct Query {
    #[serde(rename = "operationName")]
    pub operation_name: &'static str,

    pub query: String,
}

impl Query {
    /// Daily consumption for all fuels within the window.
    ///
    /// Half-hourly granularity is not available from the service.
    pub fn daily_history(window: Window) -> Self {
        const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
        let from = window.start.format(FORMAT);
        let to = window.end.format(FORMAT);
        Self {
            operation_name: "DetailedHistory",
            query: format!(
                r#"query DetailedHistory {{
    consumptionRange(granularity:daily, from:"{from}.000Z", to:"{to}.999Z") {{
        from
        partial
        estimated {{
            cost
            energy
        }}
        empty
        zoomable
        tou
        cost(costUnit:pounds)
        energy(energyUnit:kwh)
        fuel
        daysWithData
    }}
}}"#
            ),
        }
    }
}
