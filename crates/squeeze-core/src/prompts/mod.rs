//! Prompt text for model requests
//!
//! System instructions are fixed strings; user messages are MiniJinja
//! templates rendered per request.

mod system;
mod user;

pub use system::*;
pub use user::*;

use minijinja::{Environment, context};

/// Render a template string with the given context
fn render(template: &str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
    let env = Environment::new();
    env.render_str(template, ctx)
}

/// User message requesting an analysis of `ticker`
pub fn analyze_ticker_message(ticker: &str) -> Result<String, minijinja::Error> {
    render(ANALYZE_TICKER_TEMPLATE, context! { ticker => ticker })
}

/// User message requesting a synthesis over the given summary lines
pub fn synthesize_portfolio_message(holdings: &[String]) -> Result<String, minijinja::Error> {
    render(SYNTHESIZE_PORTFOLIO_TEMPLATE, context! { holdings => holdings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::ZoneKey;

    #[test]
    fn test_analyze_message_names_ticker() {
        let message = analyze_ticker_message("ZZZZ").unwrap();
        assert!(message.starts_with("Analyze ticker: ZZZZ. What company is this?"));
    }

    #[test]
    fn test_ticker_is_not_html_escaped() {
        let message = analyze_ticker_message("A&B").unwrap();
        assert!(message.contains("A&B"));
    }

    #[test]
    fn test_portfolio_message_lists_holdings() {
        let holdings = vec![
            "CRM (Salesforce): score=-72".to_string(),
            "NVDA (NVIDIA): score=88".to_string(),
        ];
        let message = synthesize_portfolio_message(&holdings).unwrap();
        assert_eq!(
            message,
            "Portfolio holdings:\nCRM (Salesforce): score=-72\nNVDA (NVIDIA): score=88\n\nSynthesize a portfolio-level diagnosis against the Agentic Squeeze thesis."
        );
    }

    #[test]
    fn test_analysis_prompt_names_every_zone_key() {
        for key in ZoneKey::ALL {
            assert!(ANALYSIS_SYSTEM_PROMPT.contains(&format!("\"{}\"", key.as_str())));
        }
    }

    #[test]
    fn test_portfolio_prompt_names_synthesis_fields() {
        for field in ["overallScore", "headline", "concentration", "blindSpot", "playbook"] {
            assert!(PORTFOLIO_SYSTEM_PROMPT.contains(field));
        }
    }
}
