use super::strategy::order_debts;
use super::types::{
    Debt, DebtPayoff, MonthSnapshot, SimulationError, SimulationResult, Strategy,
    StrategyComparison, StrategyOutcome,
};

/// Balances at or below this are treated as retired. Covers float residue left
/// after interest accrual; a ten-thousandth of a cent is forgiven at most.
const PAID_OFF_EPSILON: f64 = 1e-6;

/// Interest differences smaller than this do not change the recommendation.
const INTEREST_TIE_EPSILON: f64 = 1e-9;

#[derive(Debug)]
struct DebtLedger<'a> {
    debt: &'a Debt,
    balance: f64,
    interest_paid: f64,
    paid_off_month: Option<u32>,
}

impl<'a> DebtLedger<'a> {
    fn new(debt: &'a Debt) -> Self {
        Self {
            debt,
            balance: debt.balance,
            interest_paid: 0.0,
            paid_off_month: None,
        }
    }

    fn is_open(&self) -> bool {
        self.paid_off_month.is_none()
    }

    fn pay(&mut self, amount: f64) -> f64 {
        let applied = amount.min(self.balance).max(0.0);
        self.balance -= applied;
        applied
    }
}

#[derive(Debug, Clone, Copy)]
struct MonthTotals {
    interest: f64,
    paid: f64,
}

pub fn validate_inputs(
    debts: &[Debt],
    extra_payment: f64,
    horizon_months: u32,
) -> Result<(), SimulationError> {
    for debt in debts {
        for (field, value) in [
            ("balance", debt.balance),
            ("minPayment", debt.min_payment),
            ("interestRate", debt.interest_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidDebt {
                    id: debt.id.clone(),
                    field,
                    value,
                });
            }
        }
    }
    if !extra_payment.is_finite() || extra_payment < 0.0 {
        return Err(SimulationError::InvalidExtraPayment(extra_payment));
    }
    if horizon_months == 0 {
        return Err(SimulationError::InvalidHorizon);
    }
    Ok(())
}

/// Simulates month-by-month payoff of `debts` under `strategy`.
///
/// Every month the budget is `extra_payment` plus the minimums of all
/// simulated debts. Each open debt first receives its own minimum; whatever
/// is left (the extra payment, minimums freed by debts retired in earlier
/// months, and unused parts of minimums capped this month) goes to the open
/// debts in strategy order, cascading within the month.
///
/// Debts whose starting balance is zero are already paid off and take no part
/// in the simulation, including the budget.
pub fn simulate(
    debts: &[Debt],
    extra_payment: f64,
    strategy: Strategy,
    horizon_months: u32,
) -> Result<SimulationResult, SimulationError> {
    validate_inputs(debts, extra_payment, horizon_months)?;

    let active: Vec<Debt> = debts.iter().filter(|d| !d.is_paid_off()).cloned().collect();
    let ordered = order_debts(&active, strategy);
    let mut ledgers: Vec<DebtLedger<'_>> = ordered.iter().map(DebtLedger::new).collect();

    let starting_balance: f64 = ordered.iter().map(|d| d.balance).sum();
    let budget = extra_payment + ordered.iter().map(|d| d.min_payment).sum::<f64>();

    let mut schedule = Vec::new();
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut month = 0u32;

    while ledgers.iter().any(DebtLedger::is_open) {
        if month >= horizon_months {
            let remaining_balance: f64 = ledgers.iter().map(|l| l.balance).sum();
            tracing::debug!(
                ?strategy,
                horizon_months,
                remaining_balance,
                "simulation exceeded horizon"
            );
            return Err(SimulationError::ExceedsHorizon {
                strategy,
                horizon_months,
                remaining_balance,
            });
        }
        month += 1;

        let totals = run_month(&mut ledgers, budget, month);
        total_interest += totals.interest;
        total_paid += totals.paid;
        schedule.push(MonthSnapshot {
            month,
            interest: totals.interest,
            paid: totals.paid,
            balances: ledgers.iter().map(|l| l.balance).collect(),
        });
    }

    let mut payoff_order: Vec<DebtPayoff> = ledgers
        .iter()
        .map(|l| DebtPayoff {
            debt_id: l.debt.id.clone(),
            name: l.debt.name.clone(),
            month: l.paid_off_month.unwrap_or(0),
            interest_paid: l.interest_paid,
        })
        .collect();
    // Stable, so debts retired in the same month keep strategy order.
    payoff_order.sort_by_key(|p| p.month);

    tracing::debug!(
        ?strategy,
        months = month,
        total_interest,
        debts = ledgers.len(),
        "simulation complete"
    );

    Ok(SimulationResult {
        strategy,
        extra_payment,
        starting_balance,
        total_months: month,
        total_interest,
        total_paid,
        order: ordered.iter().map(|d| d.id.clone()).collect(),
        payoff_order,
        schedule,
    })
}

fn run_month(ledgers: &mut [DebtLedger<'_>], budget: f64, month: u32) -> MonthTotals {
    let mut interest = 0.0;
    for ledger in ledgers.iter_mut().filter(|l| l.is_open()) {
        let accrued = ledger.balance * ledger.debt.monthly_rate();
        ledger.balance += accrued;
        ledger.interest_paid += accrued;
        interest += accrued;
    }

    let mut paid = 0.0;
    for ledger in ledgers.iter_mut().filter(|l| l.is_open()) {
        paid += ledger.pay(ledger.debt.min_payment);
    }

    let mut surplus = (budget - paid).max(0.0);
    for ledger in ledgers.iter_mut().filter(|l| l.is_open()) {
        if surplus <= 0.0 {
            break;
        }
        let applied = ledger.pay(surplus);
        surplus -= applied;
        paid += applied;
    }

    for ledger in ledgers.iter_mut().filter(|l| l.is_open()) {
        if ledger.balance <= PAID_OFF_EPSILON {
            ledger.balance = 0.0;
            ledger.paid_off_month = Some(month);
        }
    }

    MonthTotals { interest, paid }
}

/// Runs both strategies from the same starting state and recommends the one
/// with the lower total interest. Ties go to Snowball.
pub fn compare_strategies(
    debts: &[Debt],
    extra_payment: f64,
    horizon_months: u32,
) -> Result<StrategyComparison, SimulationError> {
    validate_inputs(debts, extra_payment, horizon_months)?;

    let snowball = run_outcome(debts, extra_payment, Strategy::Snowball, horizon_months)?;
    let avalanche = run_outcome(debts, extra_payment, Strategy::Avalanche, horizon_months)?;

    let (recommended, interest_saved, months_saved) = match (snowball.result(), avalanche.result())
    {
        (Some(s), Some(a)) => {
            let (winner, loser) = if a.total_interest + INTEREST_TIE_EPSILON < s.total_interest {
                (a, s)
            } else {
                (s, a)
            };
            (
                Some(winner.strategy),
                (loser.total_interest - winner.total_interest).max(0.0),
                loser.total_months.saturating_sub(winner.total_months),
            )
        }
        (Some(s), None) => (Some(s.strategy), 0.0, 0),
        (None, Some(a)) => (Some(a.strategy), 0.0, 0),
        (None, None) => (None, 0.0, 0),
    };

    Ok(StrategyComparison {
        snowball,
        avalanche,
        recommended,
        interest_saved,
        months_saved,
    })
}

fn run_outcome(
    debts: &[Debt],
    extra_payment: f64,
    strategy: Strategy,
    horizon_months: u32,
) -> Result<StrategyOutcome, SimulationError> {
    match simulate(debts, extra_payment, strategy, horizon_months) {
        Ok(result) => Ok(StrategyOutcome::Completed(result)),
        Err(SimulationError::ExceedsHorizon {
            strategy,
            horizon_months,
            remaining_balance,
        }) => Ok(StrategyOutcome::ExceedsHorizon {
            strategy,
            horizon_months,
            remaining_balance,
        }),
        Err(other) => Err(other),
    }
}
