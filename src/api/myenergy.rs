//! [myenergy](https://www.britishgas.co.uk/smartreport) GraphQL client.

mod query;

use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, header};
use reqwest::{Client, Url};
use serde::Deserialize;

pub use self::query::Query;
use crate::{
    core::{consumption::ConsumptionRecord, history::HistorySource, window::Window},
    prelude::*,
    session::Session,
};

/// The service rejects non-browser user agents.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36";

pub const GRAPHQL_URL: &str = "https://www.britishgas.co.uk/myenergy_prod/me-api/graphql";

pub const TIMEOUT: Duration = Duration::from_secs(20);

pub struct Api {
    client: Client,
    url: Url,
}

impl Api {
    pub fn new(session: &Session, url: Url) -> Result<Self> {
        let mut headers = HeaderMap::new();
        // Bare token, no `Bearer` prefix:
        let mut authorization = HeaderValue::from_str(&session.token)
            .context("the session token is not a valid header value")?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .default_headers(headers)
            .build()?;
        Ok(Self { client, url })
    }

    #[instrument(skip_all, fields(operation = query.operation_name))]
    pub async fn execute(&self, query: &Query) -> Result<Vec<ConsumptionRecord>, QueryError> {
        let body = self
            .client
            .post(self.url.clone())
            .json(query)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| QueryError::Transport { source })?
            .bytes()
            .await
            .map_err(|source| QueryError::Transport { source })?;
        Response::decode(&body)
    }
}

#[async_trait]
impl HistorySource for Api {
    type Error = QueryError;

    async fn get_daily_history(
        &self,
        window: Window,
    ) -> Result<Vec<ConsumptionRecord>, QueryError> {
        self.execute(&Query::daily_history(window)).await
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum QueryError {
    #[display("failed to call the GraphQL service: {source}")]
    Transport { source: reqwest::Error },

    #[display("failed to deserialize the GraphQL response: {source}")]
    Malformed { source: serde_json::Error },

    #[display("the GraphQL service rejected the query: {message}")]
    Rejected { message: String },
}

#[derive(Deserialize)]
struct Response {
    data: Option<Data>,

    #[serde(default)]
    errors: Vec<ResponseError>,
}

#[derive(Deserialize)]
struct Data {
    #[serde(rename = "consumptionRange")]
    consumption_range: Vec<ConsumptionRecord>,
}

#[derive(Deserialize)]
struct ResponseError {
    message: String,
}

impl Response {
    fn decode(body: &[u8]) -> Result<Vec<ConsumptionRecord>, QueryError> {
        let response: Self =
            serde_json::from_slice(body).map_err(|source| QueryError::Malformed { source })?;
        if !response.errors.is_empty() {
            let message = response
                .errors
                .into_iter()
                .map(|error| error.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(QueryError::Rejected { message });
        }
        response
            .data
            .map(|data| data.consumption_range)
            .ok_or_else(|| QueryError::Rejected {
                message: String::from("no data in the response"),
            })
    }
}
