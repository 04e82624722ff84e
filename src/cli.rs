use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::run_http_server;
use crate::config::{AppConfig, load_app_configuration};
use crate::core::{
    Debt, SimulationResult, SolveConfig, Strategy, StrategyComparison, StrategyOutcome,
    compare_strategies, milestones, simulate, solve_extra_payment,
};
use crate::errors::{Error, Result};
use crate::report::{self, ReportInput, format_currency, format_duration, format_rate};
use crate::storage::{DebtBook, JsonFileStore};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Snowball,
    Avalanche,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Snowball => Strategy::Snowball,
            CliStrategy::Avalanche => Strategy::Avalanche,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "payoff",
    about = "Debt payoff planner (Snowball vs Avalanche with roll-up payments)"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a TOML config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate one strategy month by month
    Simulate {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, value_enum, default_value_t = CliStrategy::Snowball)]
        strategy: CliStrategy,
        #[arg(long, help = "Print the full result as JSON")]
        json: bool,
    },
    /// Compare Snowball and Avalanche side by side
    Compare {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, help = "Print the comparison as JSON")]
        json: bool,
    },
    /// Find the extra monthly payment needed to be debt free by a target month
    Solve {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, value_enum, default_value_t = CliStrategy::Snowball)]
        strategy: CliStrategy,
        #[arg(long)]
        target_months: u32,
        #[arg(long, default_value_t = 10_000.0, help = "Largest extra payment to try")]
        search_max: f64,
    },
    /// Render the payoff plan as a PDF
    Report {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "payoff-plan.pdf")]
        out: PathBuf,
    },
    /// Unlock the milestones reached after following the plan for some months
    Progress {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, value_enum)]
        strategy: Option<CliStrategy>,
        #[arg(long, help = "Months of the plan completed so far")]
        month: u32,
    },
    /// Manage the saved debt list
    Debts {
        #[command(subcommand)]
        action: DebtsCommand,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand, Debug)]
enum DebtsCommand {
    /// Replace the saved debt list with the contents of a JSON file
    Import { file: PathBuf },
    /// Show the saved debt list
    List,
    /// Forget saved debts and achievements
    Clear,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[arg(long, help = "JSON file with the debt list; defaults to the saved list")]
    debts: Option<PathBuf>,
    #[arg(long, help = "Extra monthly payment on top of minimums")]
    extra: Option<f64>,
    #[arg(long, help = "Give up after this many months")]
    horizon_months: Option<u32>,
}

#[derive(Debug)]
struct Plan {
    debts: Vec<Debt>,
    extra_payment: f64,
    horizon_months: u32,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = load_app_configuration(cli.config.as_deref())?;
    let book = DebtBook::new(JsonFileStore::new(config.storage.path.clone()));

    match cli.command {
        Command::Simulate {
            plan,
            strategy,
            json,
        } => {
            let plan = resolve_plan(plan, &config, &book)?;
            let result = simulate(
                &plan.debts,
                plan.extra_payment,
                strategy.into(),
                plan.horizon_months,
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_simulation(&result));
            }
        }
        Command::Compare { plan, json } => {
            let plan = resolve_plan(plan, &config, &book)?;
            let comparison =
                compare_strategies(&plan.debts, plan.extra_payment, plan.horizon_months)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                print!("{}", render_comparison(&comparison));
            }
        }
        Command::Solve {
            plan,
            strategy,
            target_months,
            search_max,
        } => {
            let plan = resolve_plan(plan, &config, &book)?;
            let mut solve = SolveConfig::new(strategy.into(), target_months, plan.horizon_months);
            solve.search_max = search_max;
            let result = solve_extra_payment(&plan.debts, solve)?;
            println!("{}", result.message);
            if let Some(extra) = result.solved_extra {
                println!(
                    "Extra monthly payment: {} ({} with {})",
                    format_currency(extra),
                    format_duration(result.achieved_months.unwrap_or(0)),
                    result.strategy.label()
                );
            }
        }
        Command::Report { plan, name, out } => {
            let plan = resolve_plan(plan, &config, &book)?;
            let comparison =
                compare_strategies(&plan.debts, plan.extra_payment, plan.horizon_months)?;
            let document = report::render(&ReportInput {
                title: &config.report.title,
                display_name: &name,
                debts: &plan.debts,
                extra_payment: plan.extra_payment,
                comparison: &comparison,
            });
            report::save_pdf(&document, &out)?;
            println!(
                "Wrote {} ({} pages)",
                out.display(),
                document.pages.len()
            );
        }
        Command::Progress {
            plan,
            strategy,
            month,
        } => {
            let plan = resolve_plan(plan, &config, &book)?;
            let strategy = match strategy {
                Some(strategy) => strategy.into(),
                None => compare_strategies(&plan.debts, plan.extra_payment, plan.horizon_months)?
                    .recommended
                    .unwrap_or(Strategy::Snowball),
            };
            let result = simulate(
                &plan.debts,
                plan.extra_payment,
                strategy,
                plan.horizon_months,
            )?;
            let reached: Vec<_> = milestones(&result)
                .into_iter()
                .filter(|m| m.month <= month)
                .collect();
            let fresh = book.unlock(&reached)?;
            if fresh.is_empty() {
                println!("No new milestones yet. Keep going!");
            }
            for milestone in fresh {
                println!("Unlocked: {} (month {})", milestone.title(), milestone.month);
            }
        }
        Command::Debts { action } => match action {
            DebtsCommand::Import { file } => {
                let debts = read_debts_file(&file)?;
                book.save_debts(&debts)?;
                println!("Saved {} debts.", debts.len());
            }
            DebtsCommand::List => print!("{}", render_debts(&book.load_debts()?)),
            DebtsCommand::Clear => {
                book.clear()?;
                println!("Cleared saved debts and achievements.");
            }
        },
        Command::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            run_http_server(config).await?;
        }
    }
    Ok(())
}

fn resolve_plan(
    args: PlanArgs,
    config: &AppConfig,
    book: &DebtBook<JsonFileStore>,
) -> Result<Plan> {
    let max_horizon = config.simulation.horizon_months;
    let horizon_months = args.horizon_months.unwrap_or(max_horizon);
    if horizon_months == 0 || horizon_months > max_horizon {
        return Err(Error::Config(format!(
            "--horizon-months must be between 1 and {max_horizon}"
        )));
    }

    let debts = match &args.debts {
        Some(path) => read_debts_file(path)?,
        None => book.load_debts()?,
    };
    Ok(Plan {
        debts,
        extra_payment: args
            .extra
            .unwrap_or(config.simulation.default_extra_payment),
        horizon_months,
    })
}

fn read_debts_file(path: &Path) -> Result<Vec<Debt>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn render_debts(debts: &[Debt]) -> String {
    if debts.is_empty() {
        return "No saved debts.\n".to_string();
    }
    let mut out = String::new();
    for debt in debts {
        out.push_str(&format!(
            "{:<24} {:>14} {:>12} {:>8}\n",
            debt.name,
            format_currency(debt.balance),
            format_currency(debt.min_payment),
            format_rate(debt.interest_rate)
        ));
    }
    out
}

fn render_simulation(result: &SimulationResult) -> String {
    let mut out = format!(
        "{}: debt free in {} ({} months), total interest {}\n",
        result.strategy.label(),
        format_duration(result.total_months),
        result.total_months,
        format_currency(result.total_interest)
    );
    for (idx, payoff) in result.payoff_order.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {:<24} month {:>4}  interest {}\n",
            idx + 1,
            payoff.name,
            payoff.month,
            format_currency(payoff.interest_paid)
        ));
    }
    out
}

fn render_comparison(comparison: &StrategyComparison) -> String {
    let mut out = String::new();
    for strategy in Strategy::ALL {
        match comparison.outcome(strategy) {
            StrategyOutcome::Completed(result) => out.push_str(&format!(
                "{:<10} {:>5} months  interest {:>14}\n",
                strategy.label(),
                result.total_months,
                format_currency(result.total_interest)
            )),
            StrategyOutcome::ExceedsHorizon {
                horizon_months,
                remaining_balance,
                ..
            } => out.push_str(&format!(
                "{:<10} not paid off within {} ({} still owed)\n",
                strategy.label(),
                format_duration(*horizon_months),
                format_currency(*remaining_balance)
            )),
        }
    }
    match comparison.recommended {
        Some(strategy) if comparison.only_recommended_completes() => out.push_str(&format!(
            "Recommended: {} (the only method that finishes within the horizon)\n",
            strategy.label()
        )),
        Some(strategy) => out.push_str(&format!(
            "Recommended: {} (saves {} in interest)\n",
            strategy.label(),
            format_currency(comparison.interest_saved)
        )),
        None => out.push_str("Neither strategy pays off these debts; raise the monthly payment.\n"),
    }
    out
}
