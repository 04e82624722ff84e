use serde::Serialize;

use super::engine::{simulate, validate_inputs};
use super::types::{Debt, SimulationError, Strategy};

#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    pub strategy: Strategy,
    pub target_months: u32,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub horizon_months: u32,
}

impl SolveConfig {
    pub fn new(strategy: Strategy, target_months: u32, horizon_months: u32) -> Self {
        Self {
            strategy,
            target_months,
            search_max: 10_000.0,
            tolerance: 0.01,
            max_iterations: 60,
            horizon_months,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_extra: f64,
    /// `None` when the candidate does not retire the debts within the horizon.
    pub total_months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    pub strategy: Strategy,
    pub target_months: u32,
    pub search_max: f64,
    pub tolerance: f64,
    pub solved_extra: Option<f64>,
    pub achieved_months: Option<u32>,
    pub achieved_interest: Option<f64>,
    pub iterations: Vec<SolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
struct CandidateEval {
    total_months: Option<u32>,
    total_interest: Option<f64>,
}

impl CandidateEval {
    fn meets(self, target_months: u32) -> bool {
        self.total_months.is_some_and(|m| m <= target_months)
    }
}

/// Finds the smallest constant extra monthly payment that retires every debt
/// within `target_months`. Bisection is valid because more extra payment never
/// lengthens the schedule.
pub fn solve_extra_payment(
    debts: &[Debt],
    config: SolveConfig,
) -> Result<SolveResult, SimulationError> {
    validate_inputs(debts, 0.0, config.horizon_months)?;
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_eval = evaluate_candidate(debts, config, 0.0)?;
    let high_eval = evaluate_candidate(debts, config, config.search_max)?;

    let mut solved_extra = None;
    let mut converged = false;
    let feasible;
    let message;

    if low_eval.meets(config.target_months) {
        solved_extra = Some(0.0);
        converged = true;
        feasible = true;
        message = "Minimum payments already meet the target.".to_string();
    } else if !high_eval.meets(config.target_months) {
        feasible = false;
        message = "No extra payment within the search bounds meets the target.".to_string();
    } else {
        let mut lo = 0.0;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let eval = evaluate_candidate(debts, config, mid)?;
            iterations.push(SolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_extra: mid,
                total_months: eval.total_months,
            });

            if eval.meets(config.target_months) {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_extra = Some(hi);
        feasible = true;
        message = if converged {
            "Solved required extra payment.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        };
    }

    let mut achieved_months = None;
    let mut achieved_interest = None;
    if let Some(extra) = solved_extra {
        let final_eval = evaluate_candidate(debts, config, extra)?;
        achieved_months = final_eval.total_months;
        achieved_interest = final_eval.total_interest;
    }

    tracing::debug!(
        strategy = ?config.strategy,
        target_months = config.target_months,
        ?solved_extra,
        feasible,
        converged,
        "extra payment solve finished"
    );

    Ok(SolveResult {
        strategy: config.strategy,
        target_months: config.target_months,
        search_max: config.search_max,
        tolerance: config.tolerance,
        solved_extra,
        achieved_months,
        achieved_interest,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn evaluate_candidate(
    debts: &[Debt],
    config: SolveConfig,
    extra: f64,
) -> Result<CandidateEval, SimulationError> {
    match simulate(debts, extra, config.strategy, config.horizon_months) {
        Ok(result) => Ok(CandidateEval {
            total_months: Some(result.total_months),
            total_interest: Some(result.total_interest),
        }),
        Err(SimulationError::ExceedsHorizon { .. }) => Ok(CandidateEval {
            total_months: None,
            total_interest: None,
        }),
        Err(other) => Err(other),
    }
}

fn validate_config(config: SolveConfig) -> Result<(), SimulationError> {
    let invalid = |msg: &str| Err(SimulationError::InvalidSolveConfig(msg.to_string()));
    if config.target_months == 0 {
        return invalid("target_months must be > 0");
    }
    if config.target_months > config.horizon_months {
        return invalid("target_months must be <= horizon_months");
    }
    if !config.search_max.is_finite() || config.search_max <= 0.0 {
        return invalid("search_max must be > 0");
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return invalid("tolerance must be > 0");
    }
    if config.max_iterations == 0 {
        return invalid("max_iterations must be > 0");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn zero_rate_loan() -> Vec<Debt> {
        vec![Debt::new("a", "Loan", 1_200.0, 100.0, 0.0)]
    }

    #[test]
    fn finds_extra_payment_for_shorter_target() {
        let config = SolveConfig::new(Strategy::Snowball, 6, 1200);
        let result = solve_extra_payment(&zero_rate_loan(), config).expect("must solve");

        assert!(result.feasible);
        assert!(result.converged);
        // 1200 over 6 months needs 200 a month: 100 minimum + 100 extra.
        assert_close(
            result.solved_extra.expect("value expected"),
            100.0,
            config.tolerance,
        );
        assert_eq!(result.achieved_months, Some(6));
        assert!(!result.iterations.is_empty());
    }

    #[test]
    fn already_meeting_target_returns_zero_extra() {
        let config = SolveConfig::new(Strategy::Avalanche, 12, 1200);
        let result = solve_extra_payment(&zero_rate_loan(), config).expect("must solve");

        assert!(result.feasible);
        assert_eq!(result.solved_extra, Some(0.0));
        assert_eq!(result.achieved_months, Some(12));
        assert!(result.iterations.is_empty());
    }

    #[test]
    fn reports_infeasible_when_bounds_too_low() {
        let mut config = SolveConfig::new(Strategy::Snowball, 2, 1200);
        config.search_max = 50.0;
        let result = solve_extra_payment(&zero_rate_loan(), config).expect("must return result");

        assert!(!result.feasible);
        assert!(result.solved_extra.is_none());
        assert!(result.achieved_months.is_none());
    }

    #[test]
    fn solves_schedules_that_do_not_amortize_on_minimums() {
        let debts = vec![Debt::new("a", "Payday loan", 5_000.0, 40.0, 36.0)];
        let config = SolveConfig::new(Strategy::Snowball, 36, 240);
        let result = solve_extra_payment(&debts, config).expect("must solve");

        assert!(result.feasible);
        let extra = result.solved_extra.expect("value expected");
        assert!(extra > 0.0);
        assert!(result.achieved_months.expect("months") <= 36);
        let cheaper = simulate(&debts, (extra - 1.0).max(0.0), Strategy::Snowball, 240);
        assert!(cheaper.map(|r| r.total_months > 36).unwrap_or(true));
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = SolveConfig::new(Strategy::Snowball, 0, 1200);
        assert!(matches!(
            solve_extra_payment(&zero_rate_loan(), config),
            Err(SimulationError::InvalidSolveConfig(_))
        ));

        config.target_months = 2_000;
        assert!(solve_extra_payment(&zero_rate_loan(), config).is_err());

        config.target_months = 12;
        config.tolerance = 0.0;
        assert!(solve_extra_payment(&zero_rate_loan(), config).is_err());
    }
}
