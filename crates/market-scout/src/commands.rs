//! Command parsing for the interactive terminal

use crate::display::TradeAction;
use crate::error::{Result, ScoutError};
use crate::model::Ticker;

/// Parsed line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Generate (or fetch the cached) report for a ticker
    Scout { ticker: Ticker },
    /// Follow-up question about the latest report
    Ask { question: String },
    /// Simulated order against the latest report's ticker
    Trade { action: TradeAction, shares: u32 },
    /// Show the latest report again
    Report,
    /// Show the capability calls of the last fresh run
    Trace,
    /// Show help
    Help,
    /// Exit the terminal
    Exit,
}

impl Command {
    /// Parse a command from user input; plain text is a question
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(ScoutError::Command("Empty input".to_string()));
        }

        let Some(body) = input.strip_prefix('/') else {
            return Ok(Command::Ask {
                question: input.to_string(),
            });
        };

        let mut parts = body.split_whitespace();
        let cmd = parts
            .next()
            .ok_or_else(|| ScoutError::Command("Empty command".to_string()))?
            .to_lowercase();
        let args: Vec<&str> = parts.collect();

        match cmd.as_str() {
            "scout" | "s" | "analyze" => {
                let symbol = args.first().ok_or_else(|| {
                    ScoutError::Command("Missing ticker for scout command".to_string())
                })?;
                Ok(Command::Scout {
                    ticker: Ticker::parse(symbol)?,
                })
            }
            "ask" | "a" => {
                if args.is_empty() {
                    return Err(ScoutError::Command("Missing question for ask command".to_string()));
                }
                Ok(Command::Ask {
                    question: args.join(" "),
                })
            }
            "trade" | "t" => {
                let action = args
                    .first()
                    .ok_or_else(|| ScoutError::Command("Missing action for trade command".to_string()))?
                    .parse()?;
                let shares = match args.get(1) {
                    None => 10,
                    Some(raw) => raw.parse::<u32>().map_err(|_| {
                        ScoutError::Command(format!("Invalid number of shares: {raw}"))
                    })?,
                };
                Ok(Command::Trade { action, shares })
            }
            "report" | "r" => Ok(Command::Report),
            "trace" => Ok(Command::Trace),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(ScoutError::Command(format!("Unknown command: {cmd}"))),
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r"
Market Scout Commands
=====================

  /scout <TICKER>               Generate a report (cached for one hour)
  /ask <question>               Ask about the latest report
  /trade <buy|sell|hold> [N]    Place a simulated order of N shares (default 10)
  /report                       Show the latest report again
  /trace                        Show capability calls from the last fresh run
  /help                         Show this help
  /exit                         Quit

Any line that does not start with / is treated as a question.
"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scout() {
        assert_eq!(
            Command::parse("/scout tsla").unwrap(),
            Command::Scout {
                ticker: Ticker::parse("TSLA").unwrap()
            }
        );
        assert!(Command::parse("/scout").is_err());
        assert!(matches!(
            Command::parse("/scout bad;sym"),
            Err(ScoutError::InvalidTicker(_))
        ));
    }

    #[test]
    fn test_plain_text_is_question() {
        assert_eq!(
            Command::parse("  what does RSI mean? ").unwrap(),
            Command::Ask {
                question: "what does RSI mean?".to_string()
            }
        );
        assert_eq!(
            Command::parse("/ask is it a buy").unwrap(),
            Command::Ask {
                question: "is it a buy".to_string()
            }
        );
    }

    #[test]
    fn test_parse_trade() {
        assert_eq!(
            Command::parse("/trade buy 25").unwrap(),
            Command::Trade {
                action: TradeAction::Buy,
                shares: 25
            }
        );
        assert_eq!(
            Command::parse("/trade hold").unwrap(),
            Command::Trade {
                action: TradeAction::Hold,
                shares: 10
            }
        );
        assert!(Command::parse("/trade buy lots").is_err());
        assert!(Command::parse("/trade short 5").is_err());
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(Command::parse("/help").unwrap(), Command::Help);
        assert_eq!(Command::parse("/Q").unwrap(), Command::Exit);
        assert_eq!(Command::parse("/trace").unwrap(), Command::Trace);
        assert!(Command::parse("/frobnicate").is_err());
        assert!(Command::parse("   ").is_err());
        assert!(Command::parse("/").is_err());
    }
}
