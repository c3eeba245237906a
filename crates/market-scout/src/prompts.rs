//! Prompt templates for the analyst persona and grounded chat

use crate::error::Result;
use crate::model::Ticker;
use minijinja::{Environment, context};

const SYSTEM: &str = "scout.system";
const INSTRUCTION: &str = "scout.instruction";
const CHAT: &str = "scout.chat";
const GREETING: &str = "scout.greeting";

const SYSTEM_TEMPLATE: &str = "\
You are a Senior Market Analyst named '{{ name }}'.
You MUST use the tools to fetch data.
After using the tools, you write a COMPLETE, multi-paragraph recommendation report.
Structure your final answer clearly with bullet points and a concluding sentence.";

const INSTRUCTION_TEMPLATE: &str = "Analyze {{ ticker }} and give me a recommendation.";

const CHAT_TEMPLATE: &str = "\
You are {{ name }}, an educational trading AI. Based on this recent report you wrote:

{{ report }}

Answer the user's question simply and educationally: {{ question }}";

const GREETING_TEMPLATE: &str =
    "I just generated a report on {{ ticker }}. What questions do you have?";

/// Persona name used across prompts
pub const PERSONA: &str = "Scout";

/// Compiled prompt set
pub struct Prompts {
    env: Environment<'static>,
}

impl Prompts {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(SYSTEM, SYSTEM_TEMPLATE)?;
        env.add_template(INSTRUCTION, INSTRUCTION_TEMPLATE)?;
        env.add_template(CHAT, CHAT_TEMPLATE)?;
        env.add_template(GREETING, GREETING_TEMPLATE)?;
        Ok(Self { env })
    }

    /// System prompt for the analysis loop
    pub fn system(&self) -> Result<String> {
        Ok(self.env.get_template(SYSTEM)?.render(context! { name => PERSONA })?)
    }

    /// Run instruction for one ticker
    pub fn instruction(&self, ticker: &Ticker) -> Result<String> {
        Ok(self
            .env
            .get_template(INSTRUCTION)?
            .render(context! { ticker => ticker.as_str() })?)
    }

    /// Grounding prompt embedding the report verbatim
    pub fn chat(&self, report: &str, question: &str) -> Result<String> {
        Ok(self.env.get_template(CHAT)?.render(context! {
            name => PERSONA,
            report => report,
            question => question,
        })?)
    }

    /// First assistant turn of a fresh chat log
    pub fn greeting(&self, ticker: &Ticker) -> Result<String> {
        Ok(self
            .env
            .get_template(GREETING)?
            .render(context! { ticker => ticker.as_str() })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompts() -> Prompts {
        Prompts::new().unwrap()
    }

    #[test]
    fn test_system_prompt() {
        let system = prompts().system().unwrap();
        assert!(system.starts_with("You are a Senior Market Analyst named 'Scout'."));
        assert!(system.contains("You MUST use the tools to fetch data."));
        assert!(system.ends_with("with bullet points and a concluding sentence."));
    }

    #[test]
    fn test_instruction() {
        let ticker = Ticker::parse("tsla").unwrap();
        assert_eq!(
            prompts().instruction(&ticker).unwrap(),
            "Analyze TSLA and give me a recommendation."
        );
    }

    #[test]
    fn test_chat_embeds_report_verbatim() {
        let report = "**TSLA** trades at $250 <above> the SMA & RSI is 55.";
        let prompt = prompts().chat(report, "what does RSI mean?").unwrap();
        assert_eq!(
            prompt,
            format!(
                "You are Scout, an educational trading AI. Based on this recent report you wrote:\n\n{report}\n\nAnswer the user's question simply and educationally: what does RSI mean?"
            )
        );
    }

    #[test]
    fn test_greeting() {
        let ticker = Ticker::parse("NVDA").unwrap();
        assert_eq!(
            prompts().greeting(&ticker).unwrap(),
            "I just generated a report on NVDA. What questions do you have?"
        );
    }
}
