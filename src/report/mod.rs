//! Payoff plan report.
//!
//! [`render`] lays out an already computed [`StrategyComparison`] as pages of
//! drawing operations; it never re-runs the simulation. [`Document::to_pdf`]
//! encodes the pages and [`save_pdf`] is the only place that touches disk.

mod content;
mod layout;
mod pdf;

use std::{fs, path::Path};

use crate::core::{
    Debt, SimulationResult, Strategy, StrategyComparison, StrategyOutcome, milestones,
};
use crate::errors::Result;

pub use content::{DEVOTIONALS, Devotional, PRAYER, PRAYER_TITLE, devotional_for};
pub use layout::{Column, Cursor, Document, DocumentBuilder, DrawOp, Font, Page, TextStyle};

#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub title: &'a str,
    pub display_name: &'a str,
    pub debts: &'a [Debt],
    pub extra_payment: f64,
    pub comparison: &'a StrategyComparison,
}

impl Document {
    pub fn to_pdf(&self) -> Vec<u8> {
        pdf::encode(self)
    }
}

pub fn save_pdf(document: &Document, path: &Path) -> Result<()> {
    fs::write(path, document.to_pdf())?;
    tracing::info!(path = %path.display(), pages = document.pages.len(), "saved report");
    Ok(())
}

pub fn render(input: &ReportInput<'_>) -> Document {
    let (mut builder, cursor) = DocumentBuilder::new();

    let cursor = title_block(&mut builder, cursor, input);
    let cursor = debt_summary(&mut builder, cursor, input);
    let cursor = strategy_comparison(&mut builder, cursor, input);
    let cursor = recommendation(&mut builder, cursor, input.comparison);

    if let Some(result) = input.comparison.recommended_result() {
        let cursor = builder.new_page();
        let cursor = payoff_plan(&mut builder, cursor, result);
        let cursor = milestone_list(&mut builder, cursor, result);
        encouragement(&mut builder, cursor, result.total_months);
    } else {
        encouragement(&mut builder, cursor, 0);
    }

    builder.number_pages();
    builder.finish()
}

fn title_block(builder: &mut DocumentBuilder, cursor: Cursor, input: &ReportInput<'_>) -> Cursor {
    let cursor = builder.line(cursor, TextStyle::TITLE, input.title);
    let cursor = builder.line(
        cursor,
        TextStyle::BODY,
        &format!("Debt payoff plan prepared for {}", display_name(input)),
    );
    builder.rule(cursor)
}

fn display_name<'a>(input: &ReportInput<'a>) -> &'a str {
    let trimmed = input.display_name.trim();
    if trimmed.is_empty() { "you" } else { trimmed }
}

fn debt_summary(builder: &mut DocumentBuilder, cursor: Cursor, input: &ReportInput<'_>) -> Cursor {
    let cursor = builder.gap(cursor, 6.0);
    let cursor = builder.line(cursor, TextStyle::HEADING, "Your Debts");

    let columns = [
        column("Debt", 216.0, false),
        column("Balance", 104.0, true),
        column("Minimum", 92.0, true),
        column("Rate", 92.0, true),
    ];
    let mut rows: Vec<Vec<String>> = input
        .debts
        .iter()
        .map(|debt| {
            vec![
                debt.name.clone(),
                format_currency(debt.balance),
                format_currency(debt.min_payment),
                format_rate(debt.interest_rate),
            ]
        })
        .collect();
    rows.push(vec![
        "Total".to_string(),
        format_currency(input.debts.iter().map(|d| d.balance).sum()),
        format_currency(input.debts.iter().map(|d| d.min_payment).sum()),
        String::new(),
    ]);
    let cursor = builder.table(cursor, &columns, &rows);

    let cursor = builder.gap(cursor, 4.0);
    builder.line(
        cursor,
        TextStyle::BODY,
        &format!(
            "Extra monthly payment: {}",
            format_currency(input.extra_payment)
        ),
    )
}

fn strategy_comparison(
    builder: &mut DocumentBuilder,
    cursor: Cursor,
    input: &ReportInput<'_>,
) -> Cursor {
    let cursor = builder.gap(cursor, 10.0);
    let cursor = builder.line(cursor, TextStyle::HEADING, "Snowball vs. Avalanche");
    let cursor = builder.paragraph(
        cursor,
        TextStyle::SMALL,
        "Snowball pays the smallest balance first for quick wins. Avalanche pays \
         the highest interest rate first to keep interest low. Both roll every \
         freed-up minimum into the next debt.",
    );
    let cursor = builder.gap(cursor, 4.0);

    let columns = [
        column("Strategy", 112.0, false),
        column("Months", 72.0, true),
        column("Debt free in", 128.0, true),
        column("Total interest", 100.0, true),
        column("Total paid", 92.0, true),
    ];
    let rows: Vec<Vec<String>> = Strategy::ALL
        .iter()
        .map(|&strategy| outcome_row(input.comparison.outcome(strategy)))
        .collect();
    builder.table(cursor, &columns, &rows)
}

fn outcome_row(outcome: &StrategyOutcome) -> Vec<String> {
    match outcome {
        StrategyOutcome::Completed(result) => vec![
            result.strategy.label().to_string(),
            result.total_months.to_string(),
            format_duration(result.total_months),
            format_currency(result.total_interest),
            format_currency(result.total_paid),
        ],
        StrategyOutcome::ExceedsHorizon {
            strategy,
            horizon_months,
            ..
        } => vec![
            strategy.label().to_string(),
            format!("> {horizon_months}"),
            "Not within horizon".to_string(),
            "-".to_string(),
            "-".to_string(),
        ],
    }
}

fn recommendation(
    builder: &mut DocumentBuilder,
    cursor: Cursor,
    comparison: &StrategyComparison,
) -> Cursor {
    let cursor = builder.gap(cursor, 10.0);
    let cursor = builder.line(cursor, TextStyle::HEADING, "Recommendation");

    let text = match comparison.recommended_result() {
        Some(result) if comparison.only_recommended_completes() => format!(
            "Only the {} method retires these debts within the planning horizon. \
             Following it has you debt free in {}, paying {} in interest.",
            result.strategy.label(),
            format_duration(result.total_months),
            format_currency(result.total_interest)
        ),
        Some(result) if comparison.interest_saved > 0.005 => format!(
            "The {} method costs the least: it saves {} in interest{} and has you \
             debt free in {}.",
            result.strategy.label(),
            format_currency(comparison.interest_saved),
            if comparison.months_saved > 0 {
                format!(", plus {} of payments,", format_duration(comparison.months_saved))
            } else {
                String::new()
            },
            format_duration(result.total_months)
        ),
        Some(result) => format!(
            "Both methods cost the same interest here. The {} method gives you \
             early wins and has you debt free in {}.",
            result.strategy.label(),
            format_duration(result.total_months)
        ),
        None => String::new(),
    };
    let cursor = if text.is_empty() {
        cursor
    } else {
        builder.paragraph(cursor, TextStyle::BODY, &text)
    };

    horizon_warnings(builder, cursor, comparison)
}

fn horizon_warnings(
    builder: &mut DocumentBuilder,
    cursor: Cursor,
    comparison: &StrategyComparison,
) -> Cursor {
    Strategy::ALL
        .iter()
        .filter_map(|&strategy| match comparison.outcome(strategy) {
            StrategyOutcome::ExceedsHorizon {
                strategy,
                horizon_months,
                remaining_balance,
            } => Some(format!(
                "Warning: with the {} method these payments do not retire the debt within \
                 {}; {} would still be owed. Increase the monthly payment to make progress.",
                strategy.label(),
                format_duration(*horizon_months),
                format_currency(*remaining_balance)
            )),
            StrategyOutcome::Completed(_) => None,
        })
        .fold(cursor, |cursor, warning| {
            let cursor = builder.gap(cursor, 4.0);
            builder.paragraph(cursor, TextStyle::STRONG, &warning)
        })
}

fn payoff_plan(builder: &mut DocumentBuilder, cursor: Cursor, result: &SimulationResult) -> Cursor {
    let cursor = builder.line(
        cursor,
        TextStyle::HEADING,
        &format!("Your {} Payoff Plan", result.strategy.label()),
    );
    let cursor = builder.gap(cursor, 4.0);

    let columns = [
        column("#", 32.0, true),
        column("Debt", 216.0, false),
        column("Paid off", 136.0, true),
        column("Interest", 120.0, true),
    ];
    let rows: Vec<Vec<String>> = result
        .payoff_order
        .iter()
        .enumerate()
        .map(|(idx, payoff)| {
            vec![
                (idx + 1).to_string(),
                payoff.name.clone(),
                format!("Month {}", payoff.month),
                format_currency(payoff.interest_paid),
            ]
        })
        .collect();
    builder.table(cursor, &columns, &rows)
}

fn milestone_list(
    builder: &mut DocumentBuilder,
    cursor: Cursor,
    result: &SimulationResult,
) -> Cursor {
    let list = milestones(result);
    if list.is_empty() {
        return cursor;
    }
    let cursor = builder.gap(cursor, 10.0);
    let cursor = builder.line(cursor, TextStyle::HEADING, "Milestones to Celebrate");
    list.iter().fold(cursor, |cursor, milestone| {
        builder.line(
            cursor,
            TextStyle::BODY,
            &format!("Month {:>3}   {}", milestone.month, milestone.title()),
        )
    })
}

fn encouragement(builder: &mut DocumentBuilder, cursor: Cursor, total_months: u32) -> Cursor {
    let devotional = devotional_for(total_months);
    let cursor = builder.gap(cursor, 12.0);
    let cursor = builder.ensure_space(cursor, 120.0);
    let cursor = builder.rule(cursor);
    let cursor = builder.line(cursor, TextStyle::HEADING, devotional.title);
    let cursor = builder.paragraph(cursor, TextStyle::STRONG, devotional.verse);
    let cursor = builder.line(cursor, TextStyle::SMALL, devotional.reference);
    let cursor = builder.gap(cursor, 4.0);
    let cursor = builder.paragraph(cursor, TextStyle::BODY, devotional.reflection);

    let cursor = builder.gap(cursor, 10.0);
    let cursor = builder.ensure_space(cursor, 80.0);
    let cursor = builder.line(cursor, TextStyle::HEADING, PRAYER_TITLE);
    builder.paragraph(cursor, TextStyle::BODY, PRAYER)
}

fn column(header: &'static str, width: f64, align_right: bool) -> Column {
    Column {
        header,
        width,
        align_right,
    }
}

/// `1234.5` becomes `$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (idx, ch) in dollars.chars().enumerate() {
        if idx > 0 && (dollars.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}%")
}

pub fn format_duration(months: u32) -> String {
    let years = months / 12;
    let rest = months % 12;
    let plural = |n: u32, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };
    match (years, rest) {
        (0, rest) => plural(rest, "month"),
        (years, 0) => plural(years, "year"),
        (years, rest) => format!("{} {}", plural(years, "year"), plural(rest, "month")),
    }
}
