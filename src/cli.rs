use std::path::Path;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;

use crate::{
    api::{
        browser::Chromium,
        myenergy::{self, GRAPHQL_URL},
    },
    core::{history::fetch_history, window::iterate_months},
    export::{ELECTRICITY_FILENAME, FuelHistories, GAS_FILENAME, save_csv},
    prelude::*,
    session::{Credentials, Portal, Timeouts, acquire_session},
    tables::build_summary_table,
};

/// First year to download the history from, starting on January 1st.
pub const BEGIN_YEAR: i32 = 2021;

/// Download British Gas myenergy data.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Account username (or email address).
    #[clap(short, long, env = "MYENERGY_EMAIL")]
    username: String,

    /// Account password, prompted for when omitted.
    #[clap(short, long, env = "MYENERGY_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl Args {
    pub async fn run(self) -> Result {
        let credentials = self.credentials()?;

        let session = {
            let mut browser = Chromium::launch().await?;
            acquire_session(&mut browser, &Portal::BRITISH_GAS, &credentials, Timeouts::default())
                .await
                .context("failed to log in")?
        };
        let api = myenergy::Api::new(&session, GRAPHQL_URL.parse()?)?;

        let windows = iterate_months(history_start()?, Local::now().naive_local());
        let history = fetch_history(&api, windows).await;
        if !history.failures.is_empty() {
            warn!(n_windows = history.failures.len(), "some periods could not be retrieved");
        }

        let histories = FuelHistories::from_records(history.records);
        save_csv(Path::new(GAS_FILENAME), &histories.gas)?;
        save_csv(Path::new(ELECTRICITY_FILENAME), &histories.electricity)?;
        println!(
            "{}",
            build_summary_table([
                (GAS_FILENAME, histories.gas.as_slice()),
                (ELECTRICITY_FILENAME, histories.electricity.as_slice()),
            ]),
        );
        Ok(())
    }

    fn credentials(self) -> Result<Credentials> {
        let password = match self.password {
            Some(password) => password,
            None => {
                rpassword::prompt_password("Password: ").context("failed to read the password")?
            }
        };
        Ok(Credentials { username: self.username, password })
    }
}

fn history_start() -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(BEGIN_YEAR, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .context("invalid start of the history")
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_short_flags() -> Result {
        let args =
            Args::try_parse_from(["myenergy-exporter", "-u", "jane@example.com", "-p", "hunter2"])?;
        let credentials = args.credentials()?;
        assert_eq!(credentials.username, "jane@example.com");
        assert_eq!(credentials.password, "hunter2");
        Ok(())
    }

    #[test]
    fn test_parse_long_flags() -> Result {
        let args = Args::try_parse_from([
            "myenergy-exporter",
            "--username",
            "jane@example.com",
            "--password",
            "hunter2",
        ])?;
        assert_eq!(args.username, "jane@example.com");
        assert_eq!(args.password.as_deref(), Some("hunter2"));
        Ok(())
    }

    #[test]
    fn test_history_start() -> Result {
        assert_eq!(history_start()?.to_string(), "2021-01-01 00:00:00");
        Ok(())
    }
}
