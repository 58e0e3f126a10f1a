/// Built-in node executors
///
/// One executor per supported node type:
/// - WebhookExecutor / TimerExecutor: trigger nodes
/// - HttpExecutor / EmailExecutor: integration nodes (simulated, no network I/O)
/// - ConditionExecutor / TransformExecutor: logic nodes backed by sandboxed Lua
///
/// Every executor reads only its own properties and the predecessor outputs it
/// is handed.

use crate::runtime::{error::NodeError, registry::NodeExecutor, script};
use crate::workflow::types::{NodeInputs, Properties};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP webhook trigger
///
/// Expected properties: { "url": "/hook", "method": "POST" }
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookExecutor;

/// Delay node
///
/// Expected properties: { "interval": 5 } (seconds, defaults to 0)
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerExecutor;

/// Outbound HTTP request
///
/// Expected properties: { "url": "https://api.example.com", "method": "GET" }
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpExecutor;

/// Outbound email
///
/// Expected properties: { "to": "ops@example.com", "subject": "..." }
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailExecutor;

/// Boolean branch evaluation
///
/// Expected properties: { "condition": "inputs.fetch.status == 200" }
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionExecutor;

/// Data transformation
///
/// Expected properties: { "script": "return { total = inputs.a.n + inputs.b.n }" }
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformExecutor;

#[async_trait]
impl NodeExecutor for WebhookExecutor {
    async fn execute(&self, properties: &Properties, _inputs: &NodeInputs) -> Result<Value, NodeError> {
        Ok(json!({
            "status": "webhook_executed",
            "url": optional_string(properties, "url")?.unwrap_or_default(),
            "method": optional_string(properties, "method")?.unwrap_or_default(),
        }))
    }
}

#[async_trait]
impl NodeExecutor for TimerExecutor {
    async fn execute(&self, properties: &Properties, _inputs: &NodeInputs) -> Result<Value, NodeError> {
        let interval = match properties.get("interval") {
            None | Some(Value::Null) => 0.0,
            Some(value) => value
                .as_f64()
                .ok_or_else(|| NodeError::invalid_property("interval", "expected a number of seconds"))?,
        };
        let delay = Duration::try_from_secs_f64(interval)
            .map_err(|e| NodeError::invalid_property("interval", e.to_string()))?;

        tracing::debug!("⏳ Timer waiting {:?}", delay);
        tokio::time::sleep(delay).await;

        Ok(json!({
            "status": "timer_completed",
            "waited": interval,
        }))
    }
}

#[async_trait]
impl NodeExecutor for HttpExecutor {
    async fn execute(&self, properties: &Properties, _inputs: &NodeInputs) -> Result<Value, NodeError> {
        let url = required_string(properties, "url")?;
        let method = optional_string(properties, "method")?
            .filter(|m| !m.is_empty())
            .unwrap_or("GET")
            .to_uppercase();

        tracing::debug!("🌐 Simulated HTTP {} {}", method, url);
        Ok(json!({
            "status": "http_request_sent",
            "url": url,
            "method": method,
        }))
    }
}

#[async_trait]
impl NodeExecutor for EmailExecutor {
    async fn execute(&self, properties: &Properties, _inputs: &NodeInputs) -> Result<Value, NodeError> {
        let to = required_string(properties, "to")?;
        Ok(json!({
            "status": "email_sent",
            "to": to,
            "subject": optional_string(properties, "subject")?.unwrap_or_default(),
        }))
    }
}

#[async_trait]
impl NodeExecutor for ConditionExecutor {
    async fn execute(&self, properties: &Properties, inputs: &NodeInputs) -> Result<Value, NodeError> {
        let condition = optional_string(properties, "condition")?.unwrap_or_default();
        let result = if condition.trim().is_empty() {
            true
        } else {
            script::evaluate_truthy(condition, inputs).await?
        };

        Ok(json!({
            "status": "condition_evaluated",
            "condition": condition,
            "result": result,
        }))
    }
}

#[async_trait]
impl NodeExecutor for TransformExecutor {
    async fn execute(&self, properties: &Properties, inputs: &NodeInputs) -> Result<Value, NodeError> {
        let script_source = optional_string(properties, "script")?.unwrap_or_default();
        let data = if script_source.trim().is_empty() {
            serde_json::to_value(inputs).map_err(|e| NodeError::Failed(e.to_string()))?
        } else {
            script::evaluate(script_source, inputs).await?
        };

        Ok(json!({
            "status": "data_transformed",
            "script": script_source,
            "data": data,
        }))
    }
}

/// String property, or `None` when absent or null
fn optional_string<'a>(properties: &'a Properties, name: &str) -> Result<Option<&'a str>, NodeError> {
    match properties.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(NodeError::invalid_property(name, "expected a string")),
    }
}

fn required_string<'a>(properties: &'a Properties, name: &str) -> Result<&'a str, NodeError> {
    match properties.get(name) {
        None | Some(Value::Null) => Err(NodeError::MissingProperty(name.to_string())),
        Some(Value::String(s)) if s.is_empty() => Err(NodeError::MissingProperty(name.to_string())),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(NodeError::invalid_property(name, "expected a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            _ => panic!("properties must be an object"),
        }
    }

    #[tokio::test]
    async fn webhook_echoes_route() {
        let output = WebhookExecutor
            .execute(&props(json!({"url": "/hook", "method": "POST"})), &NodeInputs::new())
            .await
            .unwrap();
        assert_eq!(
            output,
            json!({"status": "webhook_executed", "url": "/hook", "method": "POST"})
        );
    }

    #[tokio::test]
    async fn timer_rejects_negative_interval() {
        let err = TimerExecutor
            .execute(&props(json!({"interval": -1})), &NodeInputs::new())
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidProperty { .. }));

        let output = TimerExecutor
            .execute(&props(json!({"interval": 0})), &NodeInputs::new())
            .await
            .unwrap();
        assert_eq!(output["status"], json!("timer_completed"));
    }

    #[tokio::test]
    async fn http_requires_url_and_defaults_method() {
        let err = HttpExecutor
            .execute(&Properties::new(), &NodeInputs::new())
            .await
            .unwrap_err();
        assert_eq!(err, NodeError::MissingProperty("url".to_string()));

        let output = HttpExecutor
            .execute(&props(json!({"url": "https://example.com"})), &NodeInputs::new())
            .await
            .unwrap();
        assert_eq!(output["method"], json!("GET"));
    }

    #[tokio::test]
    async fn email_requires_string_recipient() {
        let err = EmailExecutor
            .execute(&props(json!({"to": 42})), &NodeInputs::new())
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidProperty { .. }));
    }

    #[tokio::test]
    async fn condition_uses_predecessor_outputs() {
        let mut inputs = NodeInputs::new();
        inputs.insert("fetch".to_string(), json!({"code": 200}));

        let output = ConditionExecutor
            .execute(&props(json!({"condition": "inputs.fetch.code == 200"})), &inputs)
            .await
            .unwrap();
        assert_eq!(output["result"], json!(true));

        let output = ConditionExecutor
            .execute(&props(json!({"condition": "inputs.fetch.code == 200"})), &NodeInputs::new())
            .await;
        assert!(output.is_err(), "indexing a missing predecessor is a script error");

        let output = ConditionExecutor
            .execute(&Properties::new(), &NodeInputs::new())
            .await
            .unwrap();
        assert_eq!(output["result"], json!(true));
    }

    #[tokio::test]
    async fn transform_without_script_passes_inputs_through() {
        let mut inputs = NodeInputs::new();
        inputs.insert("a".to_string(), json!(1));

        let output = TransformExecutor
            .execute(&Properties::new(), &inputs)
            .await
            .unwrap();
        assert_eq!(output["data"], json!({"a": 1}));

        let output = TransformExecutor
            .execute(&props(json!({"script": "return inputs.a + 1"})), &inputs)
            .await
            .unwrap();
        assert_eq!(output["data"], json!(2));
    }

    #[tokio::test]
    async fn logic_nodes_reject_non_string_sources() {
        let err = ConditionExecutor
            .execute(&props(json!({"condition": false})), &NodeInputs::new())
            .await
            .unwrap_err();
        assert_eq!(err, NodeError::invalid_property("condition", "expected a string"));

        let err = TransformExecutor
            .execute(&props(json!({"script": 42})), &NodeInputs::new())
            .await
            .unwrap_err();
        assert_eq!(err, NodeError::invalid_property("script", "expected a string"));

        let output = ConditionExecutor
            .execute(&props(json!({"condition": null})), &NodeInputs::new())
            .await
            .unwrap();
        assert_eq!(output["result"], json!(true));
    }

    #[tokio::test]
    async fn http_rejects_non_string_method() {
        let err = HttpExecutor
            .execute(&props(json!({"url": "https://example.com", "method": 7})), &NodeInputs::new())
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidProperty { ref name, .. } if name == "method"));
    }
}
