//! User message templates

/// Asks for one ticker's analysis
pub const ANALYZE_TICKER_TEMPLATE: &str = "Analyze ticker: {{ ticker }}. What company is this? How exposed is it to the Agentic Squeeze across the 5 disruption zones? Apply the GDT framework. Be provocative but grounded.";

/// Asks for a synthesis over one summary line per holding
pub const SYNTHESIZE_PORTFOLIO_TEMPLATE: &str = r#"Portfolio holdings:
{{ holdings | join("\n") }}

Synthesize a portfolio-level diagnosis against the Agentic Squeeze thesis."#;
