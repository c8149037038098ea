use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.dreamhost.com";

pub const RECORD_TYPE_TXT: &str = "TXT";

const RESULT_SUCCESS: &str = "success";

/// Commands understood by the provider's record store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ListRecords,
    AddRecord,
    RemoveRecord,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::ListRecords => "dns-list_records",
            Command::AddRecord => "dns-add_record",
            Command::RemoveRecord => "dns-remove_record",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Envelope returned by every API call. `data` is a list of records
/// for listings and a short status string otherwise.
#[derive(Deserialize, Debug)]
pub struct Response {
    pub result: String,
    #[serde(default)]
    pub data: Value,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.result == RESULT_SUCCESS
    }

    /// Returns the payload, or a rejection carrying whatever the
    /// provider put in `data` when `result` is not a success.
    pub fn into_data(self, cmd: Command) -> Result<Value> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(Error::Rejected {
                cmd: cmd.to_string(),
                reason: describe(&self.data),
            })
        }
    }

    pub fn into_records(self) -> Result<Vec<Record>> {
        let data = self.into_data(Command::ListRecords)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Short human readable status, e.g. `record_added`
    pub fn status(&self) -> String {
        describe(&self.data)
    }
}

fn describe(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub record: String,
    pub value: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl Record {
    /// Listings without a type are assumed to be TXT
    pub fn is_txt(&self) -> bool {
        self.kind
            .as_deref()
            .map_or(true, |kind| kind.eq_ignore_ascii_case(RECORD_TYPE_TXT))
    }

    pub fn matches(&self, name: &str) -> bool {
        self.is_txt() && self.record.eq_ignore_ascii_case(name)
    }
}
