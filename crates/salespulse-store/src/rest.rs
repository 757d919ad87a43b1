//! REST client for the hosted record store.
//!
//! The backend speaks PostgREST conventions: filters are query params
//! (`status=eq.active`, `next_trigger=lte.<ts>`, `id=in.(a,b)`), inserts are
//! JSON-array POSTs, updates are PATCHes keyed by `id=eq.<id>`.

use async_trait::async_trait;
use serde_json::Value;

use salespulse_core::config::StoreConfig;
use salespulse_core::error::{PulseError, Result};
use salespulse_core::traits::{Clause, Filter, RecordStore};

/// Hosted record store client.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PulseError::Store(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Map a filter to the store's query-param syntax.
    fn query_params(filter: &Filter) -> Vec<(String, String)> {
        filter
            .clauses()
            .iter()
            .map(|clause| match clause {
                Clause::Eq { column, value } => (column.clone(), format!("eq.{value}")),
                Clause::Lte { column, value } => (column.clone(), format!("lte.{value}")),
                Clause::In { column, values } => {
                    (column.clone(), format!("in.({})", values.join(",")))
                }
            })
            .collect()
    }

    async fn check(resp: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(PulseError::Store(format!("{action} failed {status}: {body}")))
        }
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn query(&self, table: &str, filter: &Filter) -> Result<Vec<Value>> {
        let params = Self::query_params(filter);
        let resp = self
            .auth(self.client.get(self.table_url(table)))
            .query(&params)
            .send()
            .await
            .map_err(|e| PulseError::Store(format!("Query {table}: {e}")))?;
        let resp = Self::check(resp, "Query").await?;
        resp.json::<Vec<Value>>()
            .await
            .map_err(|e| PulseError::Store(format!("Query {table} decode: {e}")))
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<()> {
        let resp = self
            .auth(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await
            .map_err(|e| PulseError::Store(format!("Insert {table}: {e}")))?;
        Self::check(resp, "Insert").await?;
        tracing::debug!("💾 Inserted {} row(s) into {table}", rows.len());
        Ok(())
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<()> {
        let resp = self
            .auth(self.client.patch(self.table_url(table)))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await
            .map_err(|e| PulseError::Store(format!("Update {table}/{id}: {e}")))?;
        Self::check(resp, "Update").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_param_mapping() {
        let filter = Filter::new()
            .eq("status", "active")
            .lte("next_trigger", "2026-08-05T12:00:00+00:00")
            .any_of("id", vec!["a".into(), "b".into()]);
        let params = RestStore::query_params(&filter);
        assert_eq!(params[0], ("status".into(), "eq.active".into()));
        assert_eq!(
            params[1],
            ("next_trigger".into(), "lte.2026-08-05T12:00:00+00:00".into())
        );
        assert_eq!(params[2], ("id".into(), "in.(a,b)".into()));
    }
}
