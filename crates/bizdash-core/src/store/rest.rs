use super::{Query, Store};
use crate::error::{DashError, Result};
use crate::types::Table;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

/// PostgREST-style HTTP backend (`{url}/rest/v1/{table}`).
pub struct RestStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestStore {
    pub fn new(url: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }

    fn query_params(query: &Query) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = query
            .filters
            .iter()
            .map(|f| (f.column.clone(), format!("{}.{}", f.op.as_str(), f.value)))
            .collect();
        if let Some(order) = &query.order {
            let dir = if order.descending { "desc" } else { "asc" };
            params.push(("order".to_string(), format!("{}.{dir}", order.column)));
        }
        if let Some(n) = query.limit {
            params.push(("limit".to_string(), n.to_string()));
        }
        params
    }

    /// Turn a non-2xx response into `DashError::Backend`, preferring the
    /// backend's own `message` field.
    fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        Err(DashError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    fn rows(resp: Response) -> Result<Vec<Value>> {
        match resp.json::<Value>()? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            single @ Value::Object(_) => Ok(vec![single]),
            other => Err(DashError::MalformedRow(format!(
                "expected an array of rows, got {other}"
            ))),
        }
    }

    fn first_row(table: Table, id: &str, resp: Response) -> Result<Value> {
        Self::rows(resp)?
            .into_iter()
            .next()
            .ok_or_else(|| DashError::not_found(table.as_str(), id))
    }
}

impl Store for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        tracing::debug!(table = table.as_str(), ?query, "select");
        let resp = self
            .authed(self.client.get(self.table_url(table)))
            .query(&Self::query_params(query))
            .send()?;
        Self::rows(Self::check(resp)?)
    }

    fn insert(&self, table: Table, row: Value) -> Result<Value> {
        tracing::debug!(table = table.as_str(), "insert");
        let resp = self
            .authed(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()?;
        Self::first_row(table, "<new>", Self::check(resp)?)
    }

    fn update(&self, table: Table, id: &str, patch: Value) -> Result<Value> {
        tracing::debug!(table = table.as_str(), id, "update");
        let resp = self
            .authed(self.client.patch(self.table_url(table)))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()?;
        Self::first_row(table, id, Self::check(resp)?)
    }

    fn delete(&self, table: Table, id: &str) -> Result<()> {
        tracing::debug!(table = table.as_str(), id, "delete");
        let resp = self
            .authed(self.client.delete(self.table_url(table)))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .send()?;
        Self::first_row(table, id, Self::check(resp)?).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn store(server: &mockito::Server) -> RestStore {
        RestStore::new(&server.url(), "anon-key", 5).unwrap()
    }

    #[test]
    fn select_encodes_filters_order_and_limit() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/rest/v1/rocks")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("quarter".into(), "eq.2025-Q1".into()),
                Matcher::UrlEncoded("order".into(), "title.asc".into()),
                Matcher::UrlEncoded("limit".into(), "5".into()),
            ]))
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"r1","title":"Hire AE","quarter":"2025-Q1"}]"#)
            .create();

        let q = Query::all()
            .eq("quarter", "2025-Q1")
            .order_by("title", false)
            .limit(5);
        let rows = store(&server).select(Table::Rocks, &q).unwrap();
        mock.assert();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "Hire AE");
    }

    #[test]
    fn insert_asks_for_representation() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/rest/v1/issues")
            .match_header("prefer", "return=representation")
            .match_body(Matcher::PartialJson(json!({"title": "Lead routing"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"i1","title":"Lead routing"}]"#)
            .create();

        let row = store(&server)
            .insert(Table::Issues, json!({"title": "Lead routing"}))
            .unwrap();
        mock.assert();
        assert_eq!(row["id"], "i1");
    }

    #[test]
    fn update_with_no_rows_is_not_found() {
        let mut server = mockito::Server::new();
        server
            .mock("PATCH", "/rest/v1/sales_targets")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.t9".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create();

        let err = store(&server)
            .update(Table::SalesTargets, "t9", json!({"stage": "won"}))
            .unwrap_err();
        assert!(matches!(err, DashError::NotFound { .. }));
    }

    #[test]
    fn backend_error_message_is_surfaced() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/rest/v1/associations")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Invalid API key"}"#)
            .create();

        let err = store(&server)
            .select(Table::Associations, &Query::all())
            .unwrap_err();
        match err {
            DashError::Backend { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn delete_filters_by_id() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", "/rest/v1/association_events")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.e1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"e1"}]"#)
            .create();

        store(&server)
            .delete(Table::AssociationEvents, "e1")
            .unwrap();
        mock.assert();
    }
}
