//! Capability trait definition

use async_trait::async_trait;
use scout_llm::tools::schema;
use serde_json::Value;

/// A named, independently invocable unit of functionality
///
/// The contract is deliberately narrow: one string argument in, one string
/// out, no error channel. Implementations catch their own failures and
/// describe them in the returned text.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Run the capability
    async fn invoke(&self, argument: &str) -> String;

    /// Registry name, also used as the function name shown to the model
    fn name(&self) -> &str;

    /// Natural-language usage description shown to the model
    fn description(&self) -> &str;

    /// Name of the single string argument
    fn argument_name(&self) -> &str {
        "ticker"
    }

    /// Description of the single string argument
    fn argument_description(&self) -> &str {
        "Uppercase stock ticker symbol, e.g. TSLA"
    }

    /// JSON schema for the argument object
    fn input_schema(&self) -> Value {
        schema::single_string(self.argument_name(), self.argument_description())
    }
}
