use std::time::Duration;

use async_trait::async_trait;
use libdreamhook::api::{Command, Record, Response, RECORD_TYPE_TXT};
use tracing::debug;

use super::dns;
use crate::error::Result;

/// Client for the Dreamhost DNS API. Every call is a GET against the
/// API root with the command and its arguments in the query string.
pub struct Provider {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl Provider {
    pub fn new(url: &str, key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            key: key.to_string(),
        })
    }

    fn query<'a>(&'a self, cmd: Command, args: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut query = vec![
            ("key", self.key.as_str()),
            ("format", "json"),
            ("cmd", cmd.as_str()),
        ];
        query.extend_from_slice(args);
        query
    }

    async fn call(&self, cmd: Command, args: &[(&str, &str)]) -> Result<Response> {
        debug!(%cmd, "provider request");
        let resp = self
            .client
            .get(&self.url)
            .query(&self.query(cmd, args))
            .send()
            .await?
            .error_for_status()?;

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn change_record(&self, cmd: Command, record: &str, value: &str) -> Result<String> {
        let args = [
            ("record", record),
            ("type", RECORD_TYPE_TXT),
            ("value", value),
        ];
        let response = self.call(cmd, &args).await?;
        let status = response.status();
        response.into_data(cmd)?;
        Ok(status)
    }
}

#[async_trait]
impl dns::Provider for Provider {
    async fn list_records(&self) -> Result<Vec<Record>> {
        Ok(self.call(Command::ListRecords, &[]).await?.into_records()?)
    }

    async fn add_record(&self, record: &str, value: &str) -> Result<String> {
        self.change_record(Command::AddRecord, record, value).await
    }

    async fn remove_record(&self, record: &str, value: &str) -> Result<String> {
        self.change_record(Command::RemoveRecord, record, value).await
    }
}
