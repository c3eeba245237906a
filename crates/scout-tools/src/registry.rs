//! Read-only registry mapping capability names to implementations

use crate::Capability;
use scout_core::{Error, Result};
use scout_llm::ToolDefinition;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Fixed set of capabilities, frozen at construction
///
/// Registration order is kept so tool definitions reach the model in a
/// stable order.
pub struct CapabilityRegistry {
    capabilities: Vec<Arc<dyn Capability>>,
    index: HashMap<String, usize>,
}

/// A call that passed name and argument validation
#[derive(Clone)]
pub struct ValidatedCall {
    /// Capability to invoke
    pub capability: Arc<dyn Capability>,
    /// Extracted string argument
    pub argument: String,
}

impl CapabilityRegistry {
    /// Start building a registry
    pub fn builder() -> CapabilityRegistryBuilder {
        CapabilityRegistryBuilder::default()
    }

    /// Get a capability by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.capabilities[i]))
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.capabilities.iter().map(|c| c.name()).collect()
    }

    /// Tool definitions for the language model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.capabilities
            .iter()
            .map(|c| ToolDefinition::new(c.name(), c.description(), c.input_schema()))
            .collect()
    }

    /// Check a proposed call against the registry before dispatch
    ///
    /// The argument may arrive as `{"<argument_name>": "..."}` (the declared
    /// schema), as a bare JSON string, or as an object holding exactly one
    /// string value. Anything else is a malformed call.
    pub fn validate(&self, name: &str, input: &Value) -> Result<ValidatedCall> {
        let capability = self.get(name).ok_or_else(|| Error::UnknownCapability {
            name: name.to_string(),
            available: self.names().join(", "),
        })?;

        let argument = extract_argument(capability.argument_name(), input).ok_or_else(|| {
            Error::MalformedCall {
                name: name.to_string(),
                reason: format!(
                    "expected {{\"{}\": <string>}}, got {input}",
                    capability.argument_name()
                ),
            }
        })?;

        let argument = argument.trim();
        if argument.is_empty() {
            return Err(Error::MalformedCall {
                name: name.to_string(),
                reason: format!("{} must not be empty", capability.argument_name()),
            });
        }

        Ok(ValidatedCall {
            capability,
            argument: argument.to_string(),
        })
    }

    /// Get the number of registered capabilities
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

fn extract_argument<'a>(key: &str, input: &'a Value) -> Option<&'a str> {
    match input {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => match map.get(key) {
            Some(v) => v.as_str(),
            None if map.len() == 1 => map.values().next().and_then(Value::as_str),
            None => None,
        },
        _ => None,
    }
}

/// Builder for [`CapabilityRegistry`]
#[derive(Default)]
pub struct CapabilityRegistryBuilder {
    capabilities: Vec<Arc<dyn Capability>>,
}

impl CapabilityRegistryBuilder {
    /// Register a capability; a later registration with the same name replaces the earlier one
    pub fn register(mut self, capability: Arc<dyn Capability>) -> Self {
        self.capabilities.retain(|c| c.name() != capability.name());
        self.capabilities.push(capability);
        self
    }

    /// Freeze the registry
    pub fn build(self) -> CapabilityRegistry {
        let index = self
            .capabilities
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name().to_string(), i))
            .collect();
        tracing::debug!(count = self.capabilities.len(), "Capability registry built");
        CapabilityRegistry {
            capabilities: self.capabilities,
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed(&'static str, &'static str);

    #[async_trait]
    impl Capability for Fixed {
        async fn invoke(&self, argument: &str) -> String {
            format!("{} for {argument}: {}", self.0, self.1)
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test capability"
        }
    }

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::builder()
            .register(Arc::new(Fixed("TechnicalAnalyst", "RSI 50")))
            .register(Arc::new(Fixed("NewsSentimentAnalyst", "Neutral")))
            .build()
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        let registry = registry();
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["TechnicalAnalyst", "NewsSentimentAnalyst"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.definitions()[0].input_schema["required"][0],
            "ticker"
        );
    }

    #[test]
    fn test_reregistration_replaces() {
        let registry = CapabilityRegistry::builder()
            .register(Arc::new(Fixed("TechnicalAnalyst", "old")))
            .register(Arc::new(Fixed("TechnicalAnalyst", "new")))
            .build();
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_validate_and_invoke() {
        let registry = registry();
        let call = registry
            .validate("TechnicalAnalyst", &json!({"ticker": " TSLA "}))
            .unwrap();
        assert_eq!(call.argument, "TSLA");
        assert_eq!(
            call.capability.invoke(&call.argument).await,
            "TechnicalAnalyst for TSLA: RSI 50"
        );
    }

    #[test]
    fn test_validate_accepts_lenient_shapes() {
        let registry = registry();
        assert_eq!(
            registry
                .validate("NewsSentimentAnalyst", &json!("NVDA"))
                .unwrap()
                .argument,
            "NVDA"
        );
        assert_eq!(
            registry
                .validate("NewsSentimentAnalyst", &json!({"symbol": "NVDA"}))
                .unwrap()
                .argument,
            "NVDA"
        );
    }

    #[test]
    fn test_unknown_capability() {
        let err = registry()
            .validate("PriceOracle", &json!({"ticker": "TSLA"}))
            .err()
            .unwrap();
        assert!(matches!(err, Error::UnknownCapability { ref name, .. } if name == "PriceOracle"));
        assert!(err.to_string().contains("TechnicalAnalyst, NewsSentimentAnalyst"));
    }

    #[test]
    fn test_malformed_arguments() {
        let registry = registry();
        for input in [
            json!({"ticker": 42}),
            json!({"a": "X", "b": "Y"}),
            json!(null),
            json!({"ticker": "   "}),
        ] {
            let err = registry.validate("TechnicalAnalyst", &input).err().unwrap();
            assert!(matches!(err, Error::MalformedCall { .. }), "input {input}");
        }
    }
}
