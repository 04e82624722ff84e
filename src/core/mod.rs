mod engine;
mod milestones;
mod solver;
mod strategy;
mod types;

pub use engine::{compare_strategies, simulate, validate_inputs};
pub use milestones::{Milestone, MilestoneKind, milestones};
pub use solver::{SolveConfig, SolveIteration, SolveResult, solve_extra_payment};
pub use strategy::{comparator, order_debts};
pub use types::{
    Debt, DebtPayoff, MonthSnapshot, SimulationError, SimulationResult, Strategy,
    StrategyComparison, StrategyOutcome,
};
