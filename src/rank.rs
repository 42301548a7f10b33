use anyhow::Result;
use chrono::NaiveDate;
use futures::stream::{FuturesUnordered, StreamExt};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::provider::DataProvider;
use crate::regime::RegimeWeights;
use crate::scoring::{RubricScorer, ScoreBreakdown};
use crate::signal::Horizon;

/// Outcome of scoring a list of companies.
#[derive(Debug, Default)]
pub struct Ranking {
    /// Sorted by final score descending, ties by company name
    pub scored: Vec<ScoreBreakdown>,
    /// Companies that could not be scored, with the reason
    pub failed: Vec<(String, String)>,
}

/// Order by final score descending, then company name ascending.
pub fn rank_order(a: &ScoreBreakdown, b: &ScoreBreakdown) -> Ordering {
    b.final_score
        .partial_cmp(&a.final_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.company.cmp(&b.company))
}

/// Score every company concurrently on tokio's blocking pool and rank them.
///
/// Company names are deduplicated case-insensitively, first spelling wins.
/// Companies the provider does not know at all are reported as failed
/// instead of ranked as neutral. Fails only if every company failed.
pub async fn score_and_rank<P>(
    scorer: Arc<RubricScorer<P>>,
    companies: &[String],
    horizon: Horizon,
    as_of: Option<NaiveDate>,
    regime_mixture: Option<RegimeWeights>,
) -> Result<Ranking>
where
    P: DataProvider + 'static,
{
    let mut seen = HashSet::new();
    let unique: Vec<String> = companies
        .iter()
        .filter(|c| seen.insert(c.to_lowercase()))
        .cloned()
        .collect();

    let mut futures = FuturesUnordered::new();
    for company in unique {
        let scorer = Arc::clone(&scorer);
        let mixture = regime_mixture.clone();
        futures.push(async move {
            let name = company.clone();
            let result = tokio::task::spawn_blocking(move || {
                scorer.score_company(&company, horizon, as_of, mixture)
            })
            .await;
            (name, result)
        });
    }

    let mut ranking = Ranking::default();
    while let Some((company, result)) = futures.next().await {
        match result {
            Ok(Ok(breakdown)) if breakdown.company_unknown() => {
                warn!(company = %company, "company unknown to the data provider");
                ranking
                    .failed
                    .push((company, "unknown to the data provider".to_string()));
            }
            Ok(Ok(breakdown)) => ranking.scored.push(breakdown),
            Ok(Err(e)) => {
                warn!(company = %company, error = %e, "scoring failed");
                ranking.failed.push((company, e.to_string()));
            }
            Err(e) => {
                warn!(company = %company, error = %e, "scoring task panicked");
                ranking.failed.push((company, format!("scoring task failed: {}", e)));
            }
        }
    }

    if ranking.scored.is_empty() && !ranking.failed.is_empty() {
        let reasons: Vec<String> = ranking
            .failed
            .iter()
            .map(|(c, e)| format!("{}: {}", c, e))
            .collect();
        anyhow::bail!("No company could be scored:\n  {}", reasons.join("\n  "));
    }

    ranking.scored.sort_by(rank_order);
    ranking.failed.sort();
    debug!(
        scored = ranking.scored.len(),
        failed = ranking.failed.len(),
        "ranking complete"
    );
    Ok(ranking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::metrics::*;
    use crate::provider::SnapshotProvider;
    use crate::regime::Regime;
    use crate::scoring::RubricConfig;

    fn scorer() -> Arc<RubricScorer<SnapshotProvider>> {
        let provider = SnapshotProvider::new()
            .with_score("Alpha", CONSTRAINT_POWER_ACCESS, 0.9)
            .with_score("Alpha", CONSTRAINT_COMPUTE_ACCESS, 0.9)
            .with_score("Alpha", CAPITAL_FREE_CASH_FLOW, 0.9)
            .with_score("Beta", CONSTRAINT_POWER_ACCESS, 0.9)
            .with_score("Beta", CONSTRAINT_COMPUTE_ACCESS, 0.9)
            .with_score("Beta", CAPITAL_FREE_CASH_FLOW, 0.2)
            .with_score("Gamma", MACRO_COMPANY_SENSITIVITY, 0.5);
        Arc::new(RubricScorer::new(provider, RubricConfig::default()).unwrap())
    }

    fn mixture() -> Option<RegimeWeights> {
        Some(RegimeWeights::new().with(Regime::HyperCompetition, 1.0))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_ranks_by_score_descending() {
        let ranking = score_and_rank(
            scorer(),
            &names(&["Beta", "Gamma", "Alpha"]),
            Horizon::Mid,
            None,
            mixture(),
        )
        .await
        .unwrap();
        let order: Vec<&str> = ranking.scored.iter().map(|b| b.company.as_str()).collect();
        assert_eq!(order, vec!["Alpha", "Beta", "Gamma"]);
        assert!(ranking.failed.is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_scored_once() {
        let ranking = score_and_rank(
            scorer(),
            &names(&["Alpha", "alpha", "ALPHA"]),
            Horizon::Short,
            None,
            mixture(),
        )
        .await
        .unwrap();
        assert_eq!(ranking.scored.len(), 1);
        assert_eq!(ranking.scored[0].company, "Alpha");
    }

    #[tokio::test]
    async fn test_unknown_company_reported_as_failed() {
        let ranking = score_and_rank(
            scorer(),
            &names(&["Alpha", "Alpah"]),
            Horizon::Mid,
            None,
            mixture(),
        )
        .await
        .unwrap();
        assert_eq!(ranking.scored.len(), 1);
        assert_eq!(ranking.failed.len(), 1);
        assert_eq!(ranking.failed[0].0, "Alpah");
        assert!(ranking.failed[0].1.contains("unknown"));
    }

    #[tokio::test]
    async fn test_all_failures_is_error() {
        let err = score_and_rank(scorer(), &names(&["Alpha", "Beta"]), Horizon::Mid, None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No company could be scored"));
    }

    #[test]
    fn test_ties_broken_by_name() {
        let provider = SnapshotProvider::new();
        let scorer = RubricScorer::new(provider, RubricConfig::default()).unwrap();
        let mut list: Vec<ScoreBreakdown> = ["Zed", "Abe"]
            .iter()
            .map(|c| scorer.score_company(c, Horizon::Mid, None, mixture()).unwrap())
            .collect();
        list.sort_by(rank_order);
        assert_eq!(list[0].company, "Abe");
        assert_eq!(list[0].final_score, list[1].final_score);
    }
}
