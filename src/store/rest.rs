use super::constants::{self, headers, tables};
use super::logging::{CallContext, CallLogger};
use super::{
    id_from_value, OptionFields, QuestionFields, TemplateFields, TemplateRecord, TemplateStore,
    TemplateSummary,
};
use crate::auth::{Session, StoreCredentials};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// PostgREST client for the hosted backend
pub struct RestStore {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    /// Whether question and option rows carry a `position` column
    position_column: bool,
    http_client: reqwest::Client,
    logger: CallLogger,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("formsmith/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: None,
            position_column: false,
            http_client,
            logger: CallLogger::default(),
        })
    }

    pub fn from_credentials(credentials: &StoreCredentials) -> Result<Self> {
        Self::new(credentials.url.clone(), credentials.api_key.clone())
    }

    /// Act on behalf of a signed-in user instead of the anonymous key
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Persist draft order in a `position` column and sort fetches by it
    ///
    /// Without it rows are written without `position` and come back in
    /// insertion order.
    pub fn with_position_column(mut self, enabled: bool) -> Self {
        self.position_column = enabled;
        self
    }

    pub fn with_logger(mut self, logger: CallLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange email and password for a session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = constants::password_grant_endpoint(&self.base_url);
        let context = self.logger.start_call("sign_in", "auth");
        let header_map = self.header_map(&context, None);
        self.logger.log_request(&context, "POST", &url, &header_map);

        let mut request = self.http_client.post(&url);
        for (name, value) in &header_map {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = request.json(&json!({
            "email": email,
            "password": password,
        }));

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.logger.complete_call(&context, None, Some(&e.to_string()));
                return Err(e).context("Sign-in request failed");
            }
        };
        let status = response.status();
        self.logger.log_response(&context, status.as_u16());
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            self.logger.complete_call(&context, Some(status.as_u16()), Some(&body));
            anyhow::bail!("Sign-in failed ({}): {}", status, body);
        }
        self.logger.complete_call(&context, Some(status.as_u16()), None);

        let token_data: Value = serde_json::from_str(&body).context("Invalid sign-in response")?;
        parse_session(&token_data, email)
    }

    /// Question or option row, without `position` unless the column is enabled
    fn ordered_row<T: Serialize>(&self, fields: &T, extra: &[(&str, Value)]) -> Result<Value> {
        let mut row = to_row(fields, extra)?;
        if !self.position_column {
            if let Some(object) = row.as_object_mut() {
                object.remove("position");
            }
        }
        Ok(row)
    }

    fn order_column(&self) -> &'static str {
        if self.position_column { "position.asc" } else { "id.asc" }
    }

    fn header_map(&self, context: &CallContext, prefer: Option<&str>) -> HashMap<String, String> {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);

        let mut header_map = HashMap::new();
        header_map.insert(headers::API_KEY.to_string(), self.api_key.clone());
        header_map.insert("Authorization".to_string(), format!("Bearer {}", bearer));
        header_map.insert("Content-Type".to_string(), headers::CONTENT_TYPE_JSON.to_string());
        header_map.insert("Accept".to_string(), headers::CONTENT_TYPE_JSON.to_string());
        header_map.insert(headers::X_CORRELATION_ID.to_string(), context.correlation_id.clone());
        if let Some(prefer) = prefer {
            header_map.insert("Prefer".to_string(), prefer.to_string());
        }
        header_map
    }

    /// Send one request against `table` and parse the JSON reply
    ///
    /// Empty bodies come back as `Value::Null`.
    async fn send(
        &self,
        call: &str,
        table: &str,
        method: Method,
        query: &[(&str, String)],
        body: Option<Value>,
        prefer: Option<&str>,
    ) -> Result<Value> {
        let url = constants::table_endpoint(&self.base_url, table);
        let context = self.logger.start_call(call, table);
        let header_map = self.header_map(&context, prefer);
        self.logger.log_request(&context, method.as_str(), &url, &header_map);

        let mut request = self.http_client.request(method, &url).query(query);
        for (name, value) in &header_map {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.logger.complete_call(&context, None, Some(&e.to_string()));
                return Err(e).with_context(|| format!("{} request on {} failed", call, table));
            }
        };

        let status = response.status();
        self.logger.log_response(&context, status.as_u16());
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            self.logger.complete_call(&context, Some(status.as_u16()), Some(&text));
            anyhow::bail!("{} on {} failed ({}): {}", call, table, status, text);
        }
        self.logger.complete_call(&context, Some(status.as_u16()), None);

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON from {} on {}", call, table))
    }

    async fn insert_one(&self, call: &str, table: &str, row: Value) -> Result<String> {
        let rows = self
            .send(call, table, Method::POST, &[], Some(row), Some(headers::PREFER_RETURN_REPRESENTATION))
            .await?;
        first_id(&rows).with_context(|| format!("{} returned no id", call))
    }

    async fn upsert_one(&self, call: &str, table: &str, row: Value) -> Result<String> {
        let rows = self
            .send(
                call,
                table,
                Method::POST,
                &[("on_conflict", "id".to_string())],
                Some(row),
                Some(headers::PREFER_UPSERT),
            )
            .await?;
        first_id(&rows).with_context(|| format!("{} returned no id", call))
    }

    async fn list_ids(&self, call: &str, table: &str, column: &str, value: &str) -> Result<Vec<String>> {
        let rows = self
            .send(
                call,
                table,
                Method::GET,
                &[("select", "id".to_string()), (column, constants::eq(value))],
                None,
                None,
            )
            .await?;
        Ok(ids_of(&rows))
    }

    async fn delete_where(&self, call: &str, table: &str, column: &str, filter: String) -> Result<()> {
        self.send(call, table, Method::DELETE, &[(column, filter)], None, Some(headers::PREFER_RETURN_MINIMAL))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for RestStore {
    async fn create_template(&self, fields: &TemplateFields) -> Result<String> {
        self.insert_one("create_template", tables::TEMPLATES, to_row(fields, &[])?)
            .await
    }

    async fn create_question(&self, template_id: &str, fields: &QuestionFields) -> Result<String> {
        let row = self.ordered_row(fields, &[("template_id", json!(template_id))])?;
        self.insert_one("create_question", tables::QUESTIONS, row).await
    }

    async fn create_options(&self, question_id: &str, options: &[OptionFields]) -> Result<Vec<String>> {
        if options.is_empty() {
            return Ok(Vec::new());
        }
        let rows = options
            .iter()
            .map(|option| self.ordered_row(option, &[("question_id", json!(question_id))]))
            .collect::<Result<Vec<_>>>()?;

        let created = self
            .send(
                "create_options",
                tables::OPTIONS,
                Method::POST,
                &[],
                Some(Value::Array(rows)),
                Some(headers::PREFER_RETURN_REPRESENTATION),
            )
            .await?;
        let ids = ids_of(&created);
        if ids.len() != options.len() {
            anyhow::bail!("create_options returned {} ids for {} rows", ids.len(), options.len());
        }
        Ok(ids)
    }

    async fn update_template(&self, id: &str, fields: &TemplateFields) -> Result<()> {
        self.send(
            "update_template",
            tables::TEMPLATES,
            Method::PATCH,
            &[("id", constants::eq(id))],
            Some(to_row(fields, &[])?),
            Some(headers::PREFER_RETURN_MINIMAL),
        )
        .await?;
        Ok(())
    }

    async fn upsert_question(&self, id: Option<&str>, template_id: &str, fields: &QuestionFields) -> Result<String> {
        let mut extra = vec![("template_id", json!(template_id))];
        if let Some(id) = id {
            extra.push(("id", json!(id)));
        }
        self.upsert_one("upsert_question", tables::QUESTIONS, self.ordered_row(fields, &extra)?)
            .await
    }

    async fn list_option_ids(&self, question_id: &str) -> Result<Vec<String>> {
        self.list_ids("list_option_ids", tables::OPTIONS, "question_id", question_id)
            .await
    }

    async fn delete_options(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let filter = constants::in_list(ids);
        // answers reference the options they picked
        self.delete_where("delete_options", tables::ANSWERS, "option_id", filter.clone())
            .await?;
        self.delete_where("delete_options", tables::OPTIONS, "id", filter)
            .await
    }

    async fn upsert_option(&self, id: Option<&str>, question_id: &str, fields: &OptionFields) -> Result<String> {
        let mut extra = vec![("question_id", json!(question_id))];
        if let Some(id) = id {
            extra.push(("id", json!(id)));
        }
        self.upsert_one("upsert_option", tables::OPTIONS, self.ordered_row(fields, &extra)?)
            .await
    }

    async fn list_question_ids(&self, template_id: &str) -> Result<Vec<String>> {
        self.list_ids("list_question_ids", tables::QUESTIONS, "template_id", template_id)
            .await
    }

    async fn delete_questions(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let filter = constants::in_list(ids);
        self.delete_where("delete_questions", tables::ANSWERS, "question_id", filter.clone())
            .await?;
        self.delete_where("delete_questions", tables::OPTIONS, "question_id", filter.clone())
            .await?;
        self.delete_where("delete_questions", tables::QUESTIONS, "id", filter)
            .await
    }

    async fn fetch_template(&self, id: &str) -> Result<Option<TemplateRecord>> {
        let rows = self
            .send(
                "fetch_template",
                tables::TEMPLATES,
                Method::GET,
                &[
                    ("select", constants::TEMPLATE_TREE_SELECT.to_string()),
                    ("id", constants::eq(id)),
                    ("questions.order", self.order_column().to_string()),
                    ("questions.options.order", self.order_column().to_string()),
                ],
                None,
                None,
            )
            .await?;

        match rows.as_array().and_then(|rows| rows.first()) {
            Some(row) => {
                let record = serde_json::from_value(row.clone())
                    .with_context(|| format!("Malformed template {}", id))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn list_templates_by_owner(&self, gmail: &str) -> Result<Vec<TemplateSummary>> {
        let rows = self
            .send(
                "list_templates_by_owner",
                tables::TEMPLATES,
                Method::GET,
                &[
                    ("select", "id,title,author,created_at".to_string()),
                    ("gmail", constants::eq(gmail)),
                    ("order", "created_at.desc".to_string()),
                ],
                None,
                None,
            )
            .await?;

        if rows.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(rows).context("Malformed template listing")
    }

    async fn delete_template(&self, id: &str) -> Result<()> {
        self.delete_where("delete_template", tables::ANSWERS, "template_id", constants::eq(id))
            .await?;

        let question_ids = self.list_question_ids(id).await?;
        if !question_ids.is_empty() {
            self.delete_where(
                "delete_template",
                tables::OPTIONS,
                "question_id",
                constants::in_list(&question_ids),
            )
            .await?;
        }

        self.delete_where("delete_template", tables::QUESTIONS, "template_id", constants::eq(id))
            .await?;
        self.delete_where("delete_template", tables::TEMPLATES, "id", constants::eq(id))
            .await
    }
}

/// Serialize `fields` into a JSON object and add the foreign-key columns
fn to_row<T: Serialize>(fields: &T, extra: &[(&str, Value)]) -> Result<Value> {
    let mut row = serde_json::to_value(fields).context("Failed to serialize row")?;
    let object = row
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Row did not serialize to an object"))?;
    for (column, value) in extra {
        object.insert(column.to_string(), value.clone());
    }
    Ok(row)
}

fn ids_of(rows: &Value) -> Vec<String> {
    match rows {
        Value::Array(rows) => rows
            .iter()
            .filter_map(|row| row.get("id").and_then(id_from_value))
            .collect(),
        Value::Object(_) => rows.get("id").and_then(id_from_value).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn first_id(rows: &Value) -> Result<String> {
    ids_of(rows)
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No id in response"))
}

fn parse_session(token_data: &Value, email: &str) -> Result<Session> {
    let access_token = token_data
        .get("access_token")
        .and_then(|t| t.as_str())
        .ok_or_else(|| anyhow::anyhow!("No access token in response"))?;

    let user = token_data.get("user");
    let email = user
        .and_then(|u| u.get("email"))
        .and_then(|e| e.as_str())
        .unwrap_or(email);
    let full_name = user
        .and_then(|u| u.get("user_metadata"))
        .and_then(|m| m.get("full_name").or_else(|| m.get("name")))
        .and_then(|n| n.as_str())
        .map(|n| n.to_string());

    let mut session = Session::new(email, full_name, access_token);
    session.refresh_token = token_data
        .get("refresh_token")
        .and_then(|t| t.as_str())
        .map(|t| t.to_string());
    session.expires_at = token_data
        .get("expires_in")
        .and_then(|e| e.as_i64())
        .map(|seconds| Utc::now() + ChronoDuration::seconds(seconds));

    Ok(session)
}
