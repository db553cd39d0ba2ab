//! Database operations through the PostgREST API

mod filter;
mod query;
mod types;

use std::time::Duration;

use reqwest::{Client, Method};
use serde::Serialize;

use crate::config::ClientOptions;
use crate::fetch::FetchBuilder;

pub use filter::*;
pub use query::*;
pub use types::*;

/// Client for database operations on one table
pub struct PostgrestClient {
    /// The base URL for the project
    url: String,

    /// The API key
    key: String,

    /// Bearer token; the API key unless a user token was supplied
    token: String,

    /// The table or view name
    table: String,

    /// HTTP client
    client: Client,

    options: ClientOptions,
}

impl PostgrestClient {
    /// Create a new PostgrestClient
    pub(crate) fn new(
        url: &str,
        key: &str,
        table: &str,
        client: Client,
        options: ClientOptions,
    ) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            token: key.to_string(),
            table: table.to_string(),
            client,
            options,
        }
    }

    /// Send requests on behalf of a signed-in user so row level security applies
    pub fn with_auth(mut self, token: &str) -> Self {
        self.token = token.to_string();
        self
    }

    fn request(&self) -> TableRequest {
        TableRequest {
            url: format!("{}/rest/v1/{}", self.url, self.table),
            key: self.key.clone(),
            token: self.token.clone(),
            schema: self.options.db_schema.clone(),
            timeout: self.options.request_timeout,
            client: self.client.clone(),
        }
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(self.request(), columns)
    }

    /// Insert data into the table
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(self.request(), values)
    }

    /// Update data in the table
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(self.request(), values)
    }

    /// Delete data from the table
    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.request())
    }
}

/// Everything a builder needs to address one table
#[derive(Clone)]
pub struct TableRequest {
    url: String,
    key: String,
    token: String,
    schema: String,
    timeout: Option<Duration>,
    client: Client,
}

impl TableRequest {
    pub(crate) fn fetch(&self, method: Method, query: &QueryBuilder) -> FetchBuilder<'_> {
        let profile_header = if method == Method::GET || method == Method::HEAD {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };

        FetchBuilder::new(&self.client, &self.url, method)
            .header("apikey", &self.key)
            .bearer_auth(&self.token)
            .header(profile_header, &self.schema)
            .timeout(self.timeout)
            .query(query.get_params())
    }
}
