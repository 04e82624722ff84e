use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Smallest balance first.
    Snowball,
    /// Highest interest rate first.
    Avalanche,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Snowball, Strategy::Avalanche];

    pub fn label(self) -> &'static str {
        match self {
            Strategy::Snowball => "Snowball",
            Strategy::Avalanche => "Avalanche",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub min_payment: f64,
    /// Nominal annual rate in percent, e.g. `19.99`.
    pub interest_rate: f64,
}

impl Debt {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
        min_payment: f64,
        interest_rate: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
            min_payment,
            interest_rate,
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.interest_rate / 100.0 / 12.0
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSnapshot {
    pub month: u32,
    pub interest: f64,
    pub paid: f64,
    /// Remaining balance per debt, aligned with `SimulationResult::order`.
    pub balances: Vec<f64>,
}

impl MonthSnapshot {
    pub fn remaining_total(&self) -> f64 {
        self.balances.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoff {
    pub debt_id: String,
    pub name: String,
    pub month: u32,
    pub interest_paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub strategy: Strategy,
    pub extra_payment: f64,
    pub starting_balance: f64,
    pub total_months: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub order: Vec<String>,
    pub payoff_order: Vec<DebtPayoff>,
    pub schedule: Vec<MonthSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum StrategyOutcome {
    Completed(SimulationResult),
    #[serde(rename_all = "camelCase")]
    ExceedsHorizon {
        strategy: Strategy,
        horizon_months: u32,
        remaining_balance: f64,
    },
}

impl StrategyOutcome {
    pub fn result(&self) -> Option<&SimulationResult> {
        match self {
            StrategyOutcome::Completed(result) => Some(result),
            StrategyOutcome::ExceedsHorizon { .. } => None,
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            StrategyOutcome::Completed(result) => result.strategy,
            StrategyOutcome::ExceedsHorizon { strategy, .. } => *strategy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub snowball: StrategyOutcome,
    pub avalanche: StrategyOutcome,
    pub recommended: Option<Strategy>,
    pub interest_saved: f64,
    pub months_saved: u32,
}

impl StrategyComparison {
    pub fn outcome(&self, strategy: Strategy) -> &StrategyOutcome {
        match strategy {
            Strategy::Snowball => &self.snowball,
            Strategy::Avalanche => &self.avalanche,
        }
    }

    pub fn recommended_result(&self) -> Option<&SimulationResult> {
        self.recommended
            .and_then(|strategy| self.outcome(strategy).result())
    }

    /// True when the recommended strategy is the only one that finished
    /// within the horizon, so no savings figure applies.
    pub fn only_recommended_completes(&self) -> bool {
        self.recommended_result().is_some()
            && Strategy::ALL
                .iter()
                .filter(|&&strategy| self.outcome(strategy).result().is_some())
                .count()
                == 1
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("debt '{id}' has invalid {field}: {value} (must be a finite, non-negative number)")]
    InvalidDebt {
        id: String,
        field: &'static str,
        value: f64,
    },

    #[error("extra payment must be a finite, non-negative number, got {0}")]
    InvalidExtraPayment(f64),

    #[error("horizon must be at least one month")]
    InvalidHorizon,

    #[error("invalid solver configuration: {0}")]
    InvalidSolveConfig(String),

    #[error(
        "payments never retire the debt: {remaining_balance:.2} still owed after {horizon_months} months"
    )]
    ExceedsHorizon {
        strategy: Strategy,
        horizon_months: u32,
        remaining_balance: f64,
    },
}

impl SimulationError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, SimulationError::ExceedsHorizon { .. })
    }
}
