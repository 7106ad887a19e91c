//! Terminal rendering for analyses and portfolios

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde_json::{Value, json};
use squeeze_core::{
    Analysis, AnalysisSource, Effect, PortfolioReport, Suggestion, SynthesisOutcome, Verdict,
    ZoneKey,
};
use std::fmt::Write;

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Cooked => Color::Red,
        Verdict::Contested => Color::Yellow,
        Verdict::Rocket => Color::Green,
    }
}

fn effect_label(effect: Effect) -> &'static str {
    match effect {
        Effect::Harmed => "harmed",
        Effect::Benefits => "benefits",
        Effect::Neutral => "neutral",
    }
}

fn verdict_cell(verdict: Verdict) -> Cell {
    Cell::new(format!("{} {}", verdict.icon(), verdict)).fg(verdict_color(verdict))
}

/// Full single-ticker report
pub fn analysis(ticker: &str, analysis: &Analysis, source: AnalysisSource) -> String {
    let verdict = analysis.verdict();
    let mut out = format!(
        "{} {ticker} · {}  {verdict}  (score {})\n",
        verdict.icon(),
        analysis.name(),
        analysis.score()
    );
    if !analysis.tagline().is_empty() {
        let _ = writeln!(out, "\"{}\"", analysis.tagline());
    }
    if source.is_ai_generated() {
        out.push_str("AI-generated analysis\n");
    }

    let mut zones = table();
    zones.set_header(vec!["Zone", "Exposure", "Effect", "Note"]);
    for (key, zone) in analysis.zones().iter() {
        let color = match zone.effect() {
            Effect::Harmed => Color::Red,
            Effect::Benefits => Color::Green,
            Effect::Neutral => Color::Reset,
        };
        zones.add_row(vec![
            Cell::new(key.title()),
            Cell::new(zone.exposure()).fg(color),
            Cell::new(effect_label(zone.effect())),
            Cell::new(zone.note()),
        ]);
    }
    let _ = writeln!(out, "{zones}");

    if let Some((key, _)) = analysis.zones().most_exposed() {
        let _ = writeln!(out, "Most exposed: {}", key.title());
    }
    if !analysis.wall_street().is_empty() {
        let _ = writeln!(out, "\nWall Street says: {}", analysis.wall_street());
    }
    if !analysis.defense().is_empty() {
        let _ = writeln!(out, "\nThe defense: {}", analysis.defense());
    }
    out.trim_end().to_string()
}

/// Per-ticker table followed by the synthesis section
pub fn portfolio(report: &PortfolioReport) -> String {
    let mut holdings = table();
    holdings.set_header(vec!["Ticker", "Company", "Score", "Verdict", "Tagline"]);
    for resolution in &report.results {
        let analysis = &resolution.analysis;
        holdings.add_row(vec![
            Cell::new(&resolution.ticker),
            Cell::new(analysis.name()),
            Cell::new(analysis.score()),
            verdict_cell(analysis.verdict()),
            Cell::new(analysis.tagline()),
        ]);
    }

    let mut out = holdings.to_string();
    if !report.skipped.is_empty() {
        let _ = write!(out, "\nSkipped: {}", report.skipped.join(", "));
    }

    match &report.synthesis {
        SynthesisOutcome::Completed { synthesis } => {
            let verdict = synthesis.overall_verdict();
            let _ = write!(
                out,
                "\n\n{} Portfolio: {verdict} (score {})\n{}",
                verdict.icon(),
                synthesis.overall_score(),
                synthesis.headline
            );
            for (label, text) in [
                ("Concentration", &synthesis.concentration),
                ("Blind spot", &synthesis.blind_spot),
                ("Playbook", &synthesis.playbook),
            ] {
                if !text.is_empty() {
                    let _ = write!(out, "\n\n{label}: {text}");
                }
            }
        }
        SynthesisOutcome::Failed { message, .. } => {
            let _ = write!(out, "\n\n{message}");
        }
        SynthesisOutcome::Skipped { reason } => {
            let _ = write!(out, "\n\nNo portfolio synthesis: {reason}");
        }
    }
    out
}

pub fn suggestions(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return "No suggestions".to_string();
    }

    let mut table = table();
    table.set_header(vec!["Ticker", "Company"]);
    for suggestion in suggestions {
        match suggestion {
            Suggestion::Known { ticker, name } => table.add_row(vec![ticker.as_str(), name.as_str()]),
            Suggestion::Custom { ticker } => {
                table.add_row(vec![ticker.as_str(), "analyze with AI"])
            }
        };
    }
    table.to_string()
}

pub fn zones_table() -> String {
    let mut table = table();
    table.set_header(vec!["Zone", "What happens", "Typically exposed"]);
    for key in ZoneKey::ALL {
        table.add_row(vec![key.title(), key.description(), key.typically_exposed()]);
    }
    table.to_string()
}

pub fn zones_json() -> Value {
    ZoneKey::ALL
        .iter()
        .map(|key| {
            json!({
                "key": key.as_str(),
                "title": key.title(),
                "description": key.description(),
                "typicallyExposed": key.typically_exposed(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use squeeze_core::{KnowledgeBase, PortfolioSynthesis, Resolution};

    fn crm() -> Analysis {
        KnowledgeBase::builtin().unwrap().lookup("CRM").unwrap().clone()
    }

    #[test]
    fn test_analysis_render() {
        let text = analysis("CRM", &crm(), AnalysisSource::KnowledgeBase);
        assert!(text.starts_with("🔥 CRM · Salesforce  COOKED  (score -72)"));
        assert!(text.contains("Ephemeral App Generator"));
        assert!(!text.contains("AI-generated"));
    }

    #[test]
    fn test_generated_analysis_is_flagged() {
        let text = analysis("ZZZZ", &Analysis::new("Zeta", 45), AnalysisSource::Generated);
        assert!(text.contains("AI-generated analysis"));
        assert!(text.contains("No data"));
    }

    #[test]
    fn test_portfolio_render() {
        let mut synthesis = PortfolioSynthesis::new(-40);
        synthesis.headline = "Half cooked".into();
        let report = PortfolioReport {
            requested: vec!["CRM".into(), "ZZZZ".into()],
            results: vec![Resolution {
                ticker: "CRM".into(),
                analysis: crm(),
                source: AnalysisSource::KnowledgeBase,
            }],
            skipped: vec!["ZZZZ".into()],
            synthesis: SynthesisOutcome::Completed { synthesis },
        };

        let text = portfolio(&report);
        assert!(text.contains("Salesforce"));
        assert!(text.contains("Skipped: ZZZZ"));
        assert!(text.contains("Portfolio: CONTESTED (score -40)"));
        assert!(text.contains("Half cooked"));
    }

    #[test]
    fn test_zones_json_lists_every_zone() {
        let zones = zones_json();
        assert_eq!(zones.as_array().map(Vec::len), Some(5));
        assert_eq!(zones[2]["key"], "zeroTicket");
    }

    #[test]
    fn test_empty_suggestions() {
        assert_eq!(suggestions(&[]), "No suggestions");
    }
}
