use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::groups::FactorGroup;
use crate::provider::MetricInfo;
use crate::scoring::{GroupWeights, ScoreBreakdown};
use crate::signal::format_as_of;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a final score with sign and one decimal.
/// If degraded is true, appends asterisk to indicate fallback metrics
pub fn format_score(score: f64, degraded: bool) -> String {
    let formatted = format!("{:+.1}", score);
    // "-0.0" reads like a negative score
    let formatted = if formatted == "-0.0" { "+0.0".to_string() } else { formatted };
    if degraded {
        format!("{}*", formatted)
    } else {
        formatted
    }
}

fn paint_score(text: &str, score: f64) -> String {
    if score > 0.0 {
        text.green().bold().to_string()
    } else if score < 0.0 {
        text.red().bold().to_string()
    } else {
        text.dimmed().to_string()
    }
}

/// Format breakdowns as a ranked table with columns: Index, Score, Company,
/// Gate, Risk. Input is expected to be ranked already.
/// Index column: 3 chars (fits "99."), right-aligned
/// Score column is right-aligned, 7 chars wide (fits "+100.0*")
pub fn format_ranked_table(breakdowns: &[ScoreBreakdown], use_colors: bool) -> String {
    if breakdowns.is_empty() {
        return "No companies scored.".to_string();
    }

    let name_width = breakdowns
        .iter()
        .map(|b| b.company.chars().count())
        .max()
        .unwrap_or(0)
        .max(7);
    let separator = "  ";

    breakdowns
        .iter()
        .enumerate()
        .map(|(idx, b)| {
            // 1-based index, right-aligned with trailing dot
            let index_str = format!("{:>2}.", idx + 1);
            let degraded = !b.degraded_groups().is_empty();
            let score_str = format!("{:>7}", format_score(b.final_score, degraded));
            let company = format!("{:<width$}", b.company, width = name_width);
            let detail = format!(
                "gate {:.2}  mult {:.2}  risk {:.2}",
                b.gate_multiplier, b.multiplier_product, b.risk_index
            );

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    index_str.dimmed(),
                    paint_score(&score_str, b.final_score),
                    separator,
                    company.bold(),
                    separator,
                    detail.dimmed()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    index_str, score_str, separator, company, separator, detail
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one breakdown as a multi-line explanation: header, regime
/// mixture, per-group contributions, risk channels and fallbacks.
pub fn format_explanation(b: &ScoreBreakdown, weights: &GroupWeights, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let header = format!(
        "{}  {}  horizon {}  as of {}",
        b.company,
        format_score(b.final_score, !b.degraded_groups().is_empty()),
        b.horizon,
        format_as_of(b.as_of)
    );
    lines.push(if use_colors { header.bold().to_string() } else { header });

    let mixture = b
        .regime_mixture
        .iter()
        .filter(|(_, w)| *w > 0.0)
        .map(|(r, w)| format!("{} {:.2}", r, w))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("  Regimes: {}", mixture));
    lines.push(format!(
        "  Base {:+.3}  x gate {:.3}  x mult {:.3}  x risk discount {:.3}",
        b.base_additive, b.gate_multiplier, b.multiplier_product, b.risk_discount
    ));
    lines.push(String::new());

    for group in FactorGroup::ALL {
        let Some(out) = b.group_outputs.get(&group) else {
            continue;
        };
        let weight = weights.get(group);
        let title = format!("{:<28}", group.title());
        let contribution = format!(
            "{:+.3} (w {:.2}, additive {:+.3})",
            weight * out.additive,
            weight,
            out.additive
        );
        if use_colors {
            lines.push(format!("  {} {}", title.cyan(), contribution));
        } else {
            lines.push(format!("  {} {}", title, contribution));
        }

        for (name, v) in &out.gates {
            let text = format!("      gate {:<18} {:.3}", name, v);
            lines.push(if use_colors && *v < 0.5 { text.red().to_string() } else { text });
        }
        for (name, v) in &out.multipliers {
            lines.push(format!("      mult {:<18} {:.3}", name, v));
        }
        for (channel, v) in &out.risk {
            lines.push(format!("      risk {:<18} {:.3}", channel.name(), v));
        }
        for (metric, reason) in out.fallbacks() {
            let text = format!("      fallback {}: {}", metric, reason);
            lines.push(if use_colors { text.yellow().to_string() } else { text });
        }
    }

    lines.push(String::new());
    let channels = if b.risk_channels.is_empty() {
        "none".to_string()
    } else {
        b.risk_channels
            .iter()
            .map(|(c, v)| format!("{} {:.2}", c, v))
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(format!("  Risk index {:.3} ({})", b.risk_index, channels));
    if let Some((name, v)) = b.tightest_gate() {
        lines.push(format!("  Tightest gate {} {:.3}", name, v));
    }

    lines.join("\n")
}

/// Format the metric catalog, one id per line with its description.
pub fn format_metric_catalog(metrics: &[MetricInfo], use_colors: bool) -> String {
    let width = metrics.iter().map(|m| m.id.len()).max().unwrap_or(0);
    metrics
        .iter()
        .map(|m| {
            let id = format!("{:<width$}", m.id, width = width);
            if use_colors {
                format!("{}  {}", id.bold(), m.description.dimmed())
            } else {
                format!("{}  {}", id, m.description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format breakdowns as tab-separated values for scripting
/// Columns: rank, score, company (no headers, no colors)
pub fn format_tsv(breakdowns: &[ScoreBreakdown]) -> String {
    breakdowns
        .iter()
        .enumerate()
        .map(|(idx, b)| format!("{}\t{:.2}\t{}", idx + 1, b.final_score, b.company))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::metrics::*;
    use crate::provider::{SnapshotProvider, METRICS};
    use crate::regime::{Regime, RegimeWeights};
    use crate::scoring::{RubricConfig, RubricScorer};
    use crate::signal::Horizon;

    fn sample(company: &str, power: f64) -> ScoreBreakdown {
        let provider = SnapshotProvider::new()
            .with_score(company, CONSTRAINT_POWER_ACCESS, power)
            .with_score(company, CONSTRAINT_COMPUTE_ACCESS, 0.9)
            .with_score(company, TRUST_SECURITY_MATURITY, 0.8);
        let scorer = RubricScorer::new(provider, RubricConfig::default()).unwrap();
        scorer
            .score_company(
                company,
                Horizon::Mid,
                None,
                Some(RegimeWeights::new().with(Regime::PowerConstrainedBoom, 1.0)),
            )
            .unwrap()
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(12.345, false), "+12.3");
        assert_eq!(format_score(-7.0, false), "-7.0");
        assert_eq!(format_score(0.0, true), "+0.0*");
        assert_eq!(format_score(-0.01, false), "+0.0");
    }

    #[test]
    fn test_format_ranked_table_empty() {
        assert_eq!(format_ranked_table(&[], false), "No companies scored.");
    }

    #[test]
    fn test_format_ranked_table_rows() {
        let rows = vec![sample("Alpha", 0.9), sample("Beta", 0.0)];
        let result = format_ranked_table(&rows, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[0].contains("Alpha"));
        // Missing metrics mark the score as degraded
        assert!(lines[0].contains('*'));
        assert!(lines[1].contains("Beta"));
        assert!(lines[1].contains("gate 0.00"));
    }

    #[test]
    fn test_format_explanation_lists_groups_and_fallbacks() {
        let b = sample("Alpha", 0.9);
        let text = format_explanation(&b, &GroupWeights::default(), false);
        assert!(text.starts_with("Alpha"));
        assert!(text.contains("Regimes: power_constrained_boom 1.00"));
        for group in FactorGroup::ALL {
            assert!(text.contains(group.title()), "missing {}", group.title());
        }
        assert!(text.contains("gate power_gate"));
        assert!(text.contains(&format!("fallback {}", TRUST_AUDITABILITY)));
        assert!(text.contains("Risk index"));
        // power 0.9 clears its gate, the missing incident metric leaves trust open
        assert!(text.contains("Tightest gate"));
    }

    #[test]
    fn test_format_explanation_names_closed_gate() {
        let b = sample("Beta", 0.0);
        let text = format_explanation(&b, &GroupWeights::default(), false);
        assert!(text.contains("Tightest gate power_gate 0.000"));
    }

    #[test]
    fn test_format_metric_catalog() {
        let text = format_metric_catalog(METRICS, false);
        assert_eq!(text.lines().count(), METRICS.len());
        assert!(text.contains(CAPITAL_MOONSHOT));
    }

    #[test]
    fn test_format_tsv() {
        let rows = vec![sample("Alpha", 0.9)];
        let tsv = format_tsv(&rows);
        assert!(tsv.starts_with("1\t"));
        assert!(tsv.ends_with("\tAlpha"));
        assert_eq!(tsv.split('\t').count(), 3);
    }
}
