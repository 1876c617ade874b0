//! Column Resolver
//!
//! Selects one representative test run per execution request ("column") and
//! buckets the remaining candidates as non-comparable. With exactly two
//! columns the pairing policy applies: same test plan on both sides pairs
//! runs by test-case id, otherwise by exact run name. Any other column count
//! takes the first candidate per column. Column order always follows the
//! caller's order.

use stepdiff_common::{Result, RunSource, TestRun};
use tracing::debug;

/// One resolved comparison column
#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    pub column_key: String,
    pub display_name: String,
    /// The representative run; `None` when the execution request has no
    /// candidate runs at all (the column still renders, fully empty).
    pub run: Option<TestRun>,
    /// Candidates that did not get selected, passed through unaligned.
    pub non_comparable: Vec<TestRun>,
}

/// Resolve one representative run per execution request.
pub async fn resolve_columns(
    runs: &dyn RunSource,
    execution_request_ids: &[String],
) -> Result<Vec<ResolvedColumn>> {
    let mut requests = Vec::with_capacity(execution_request_ids.len());
    let mut candidates = Vec::with_capacity(execution_request_ids.len());
    for id in execution_request_ids {
        requests.push(runs.execution_request(id).await?);
        candidates.push(runs.runs_for_request(id).await?);
    }

    let picks = match candidates.len() {
        2 => {
            let same_plan = requests[0].test_plan_id.is_some()
                && requests[0].test_plan_id == requests[1].test_plan_id;
            pair_two_columns(&candidates[0], &candidates[1], same_plan)
        }
        _ => candidates.iter().map(|runs| runs.first().cloned()).collect(),
    };

    let mut columns = Vec::with_capacity(requests.len());
    for ((request, runs), pick) in requests.into_iter().zip(candidates).zip(picks) {
        let non_comparable = runs
            .into_iter()
            .filter(|run| pick.as_ref().map_or(true, |p| p.id != run.id))
            .collect();
        debug!(
            execution_request = %request.id,
            representative = pick.as_ref().map(|r| r.id.as_str()).unwrap_or("none"),
            "resolved comparison column"
        );
        columns.push(ResolvedColumn {
            column_key: request.id,
            display_name: request.name,
            run: pick,
            non_comparable,
        });
    }
    Ok(columns)
}

/// Pair runs across two columns: the first run of the left column that has a
/// partner on the right wins. Same test plan pairs by test-case id,
/// different plans pair by exact run name. No pair found falls back to the
/// first candidate on each side.
fn pair_two_columns(
    left: &[TestRun],
    right: &[TestRun],
    same_plan: bool,
) -> Vec<Option<TestRun>> {
    let partner_of = |candidate: &TestRun| -> Option<&TestRun> {
        right.iter().find(|other| {
            if same_plan {
                candidate.test_case_id.is_some() && candidate.test_case_id == other.test_case_id
            } else {
                candidate.name == other.name
            }
        })
    };

    for candidate in left {
        if let Some(partner) = partner_of(candidate) {
            return vec![Some(candidate.clone()), Some(partner.clone())];
        }
    }
    vec![left.first().cloned(), right.first().cloned()]
}
