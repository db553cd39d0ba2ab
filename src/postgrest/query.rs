//! Query builders for PostgrestClient

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Error;
use crate::postgrest::filter::FilterOperator;
use crate::postgrest::types::{ReturnOption, SINGLE_OBJECT};
use crate::postgrest::TableRequest;

/// Ordered query-string parameters
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Create a new QueryBuilder
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter to the query. Filters on the same column accumulate.
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Set a parameter, replacing any previous value for the key
    pub fn set_param(&mut self, key: &str, value: &str) {
        self.params.retain(|(k, _)| k != key);
        self.add_param(key, value);
    }

    /// Add a filter expression
    pub fn add_filter(&mut self, column: &str, operator: FilterOperator, value: &str) {
        self.add_param(column, &operator.apply(value));
    }

    /// Get the query parameters
    pub fn get_params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Strip whitespace outside of quoted identifiers, so `"*, variants (*)"`
/// becomes `*,variants(*)`.
pub fn clean_columns(columns: &str) -> String {
    let mut quoted = false;
    columns
        .chars()
        .filter(|c| {
            if *c == '"' {
                quoted = !quoted;
            }
            quoted || !c.is_whitespace()
        })
        .collect()
}

fn total_from_content_range(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.parse().ok()
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    request: TableRequest,
    query: QueryBuilder,
}

impl SelectBuilder {
    pub(crate) fn new(request: TableRequest, columns: &str) -> Self {
        let mut query = QueryBuilder::new();
        query.set_param("select", &clean_columns(columns));
        Self { request, query }
    }

    /// Filter rows where column equals a value
    pub fn eq<T: ToString>(mut self, column: &str, value: T) -> Self {
        self.query
            .add_filter(column, FilterOperator::Eq, &value.to_string());
        self
    }

    /// Filter rows where column does not equal a value
    pub fn neq<T: ToString>(mut self, column: &str, value: T) -> Self {
        self.query
            .add_filter(column, FilterOperator::Neq, &value.to_string());
        self
    }

    /// Order the results by a column
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.query
            .set_param("order", &format!("{}.{}", column, direction));
        self
    }

    /// Limit the number of rows returned
    pub fn limit(mut self, count: usize) -> Self {
        self.query.set_param("limit", &count.to_string());
        self
    }

    /// Execute the query and return the rows
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        self.request
            .fetch(Method::GET, &self.query)
            .execute::<Vec<T>>()
            .await
    }

    /// Execute the query expecting exactly one row.
    ///
    /// Zero or several matches surface as an API error with code `PGRST116`.
    pub async fn single<T: DeserializeOwned>(&self) -> Result<T, Error> {
        self.request
            .fetch(Method::GET, &self.query)
            .header("Accept", SINGLE_OBJECT)
            .execute::<T>()
            .await
    }

    /// Execute the query expecting zero or one row
    pub async fn maybe_single<T: DeserializeOwned>(&self) -> Result<Option<T>, Error> {
        match self.single::<T>().await {
            Ok(row) => Ok(Some(row)),
            Err(e) if e.is_no_rows() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Count matching rows exactly
    pub async fn count(&self) -> Result<u64, Error> {
        let response = self
            .request
            .fetch(Method::GET, &self.query)
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let from_header = response
            .headers()
            .get("Content-Range")
            .and_then(|v| v.to_str().ok())
            .and_then(total_from_content_range);
        if let Some(total) = from_header {
            return Ok(total);
        }

        let bytes = response.bytes().await?;
        let rows: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;
        Ok(rows.len() as u64)
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    request: TableRequest,
    values: T,
    query: QueryBuilder,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(request: TableRequest, values: T) -> Self {
        Self {
            request,
            values,
            query: QueryBuilder::new(),
        }
    }

    /// Columns (and embedded relations) to return for the inserted rows
    pub fn select(mut self, columns: &str) -> Self {
        self.query.set_param("select", &clean_columns(columns));
        self
    }

    /// Execute the insert and return the inserted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        self.request
            .fetch(Method::POST, &self.query)
            .header("Prefer", ReturnOption::Representation.prefer())
            .json(&self.values)?
            .execute::<Vec<R>>()
            .await
    }

    /// Execute the insert of one row and return it
    pub async fn single<R: DeserializeOwned>(&self) -> Result<R, Error> {
        self.request
            .fetch(Method::POST, &self.query)
            .header("Prefer", ReturnOption::Representation.prefer())
            .header("Accept", SINGLE_OBJECT)
            .json(&self.values)?
            .execute::<R>()
            .await
    }

    /// Execute the insert without returning the inserted data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        self.request
            .fetch(Method::POST, &self.query)
            .header("Prefer", ReturnOption::Minimal.prefer())
            .json(&self.values)?
            .execute_raw()
            .await
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    request: TableRequest,
    values: T,
    query: QueryBuilder,
}

impl<T: Serialize> UpdateBuilder<T> {
    pub(crate) fn new(request: TableRequest, values: T) -> Self {
        Self {
            request,
            values,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(mut self, column: &str, value: V) -> Self {
        self.query
            .add_filter(column, FilterOperator::Eq, &value.to_string());
        self
    }

    /// Columns (and embedded relations) to return for the updated rows
    pub fn select(mut self, columns: &str) -> Self {
        self.query.set_param("select", &clean_columns(columns));
        self
    }

    /// Execute the update and return the updated rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        self.request
            .fetch(Method::PATCH, &self.query)
            .header("Prefer", ReturnOption::Representation.prefer())
            .json(&self.values)?
            .execute::<Vec<R>>()
            .await
    }

    /// Execute the update of exactly one row and return it
    pub async fn single<R: DeserializeOwned>(&self) -> Result<R, Error> {
        self.request
            .fetch(Method::PATCH, &self.query)
            .header("Prefer", ReturnOption::Representation.prefer())
            .header("Accept", SINGLE_OBJECT)
            .json(&self.values)?
            .execute::<R>()
            .await
    }

    /// Execute the update without returning the updated data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        self.request
            .fetch(Method::PATCH, &self.query)
            .header("Prefer", ReturnOption::Minimal.prefer())
            .json(&self.values)?
            .execute_raw()
            .await
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    request: TableRequest,
    query: QueryBuilder,
}

impl DeleteBuilder {
    pub(crate) fn new(request: TableRequest) -> Self {
        Self {
            request,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(mut self, column: &str, value: V) -> Self {
        self.query
            .add_filter(column, FilterOperator::Eq, &value.to_string());
        self
    }

    /// Execute the delete and return the deleted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        self.request
            .fetch(Method::DELETE, &self.query)
            .header("Prefer", ReturnOption::Representation.prefer())
            .execute::<Vec<R>>()
            .await
    }

    /// Execute the delete without returning the deleted data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        self.request
            .fetch(Method::DELETE, &self.query)
            .header("Prefer", ReturnOption::Minimal.prefer())
            .execute_raw()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_whitespace_outside_quotes() {
        assert_eq!(clean_columns("*, variants (*)"), "*,variants(*)");
        assert_eq!(clean_columns("id, \"full name\""), "id,\"full name\"");
        assert_eq!(
            clean_columns("\n  *,\n  stores (\n    id,\n    name\n  )\n"),
            "*,stores(id,name)"
        );
    }

    #[test]
    fn reads_total_from_content_range() {
        assert_eq!(total_from_content_range("0-4/5"), Some(5));
        assert_eq!(total_from_content_range("*/0"), Some(0));
        assert_eq!(total_from_content_range("0-4/*"), None);
    }

    #[test]
    fn set_param_replaces_but_filters_accumulate() {
        let mut query = QueryBuilder::new();
        query.set_param("limit", "1");
        query.set_param("limit", "10");
        query.add_filter("id", FilterOperator::Eq, "a");
        query.add_filter("id", FilterOperator::Neq, "b");
        assert_eq!(
            query.get_params(),
            &[
                ("limit".to_string(), "10".to_string()),
                ("id".to_string(), "eq.a".to_string()),
                ("id".to_string(), "neq.b".to_string()),
            ]
        );
    }
}
