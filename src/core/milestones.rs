//! Progress milestones derived from a payoff schedule.
//!
//! These back the achievement badges: the first debt retired, half of the
//! starting principal gone, each individual debt paid off, and debt freedom.

use serde::Serialize;

use super::types::SimulationResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MilestoneKind {
    FirstDebtPaid,
    #[serde(rename_all = "camelCase")]
    DebtPaidOff {
        debt_id: String,
        name: String,
    },
    HalfwayThere,
    DebtFree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub month: u32,
    #[serde(flatten)]
    pub kind: MilestoneKind,
}

impl Milestone {
    /// Stable key under which an unlocked milestone is remembered.
    pub fn achievement_key(&self) -> String {
        match &self.kind {
            MilestoneKind::FirstDebtPaid => "first-debt-paid".to_string(),
            MilestoneKind::DebtPaidOff { debt_id, .. } => format!("debt-paid-off:{debt_id}"),
            MilestoneKind::HalfwayThere => "halfway-there".to_string(),
            MilestoneKind::DebtFree => "debt-free".to_string(),
        }
    }

    pub fn title(&self) -> String {
        match &self.kind {
            MilestoneKind::FirstDebtPaid => "First debt paid off".to_string(),
            MilestoneKind::DebtPaidOff { name, .. } => format!("{name} paid off"),
            MilestoneKind::HalfwayThere => "Halfway there".to_string(),
            MilestoneKind::DebtFree => "Debt free".to_string(),
        }
    }
}

/// Milestones in month order. Within a month the order is: first debt, each
/// debt retired that month, halfway point, debt free.
pub fn milestones(result: &SimulationResult) -> Vec<Milestone> {
    let Some(first) = result.payoff_order.first() else {
        return Vec::new();
    };

    let mut ranked = vec![(
        0u8,
        Milestone {
            month: first.month,
            kind: MilestoneKind::FirstDebtPaid,
        },
    )];
    ranked.extend(result.payoff_order.iter().map(|payoff| {
        (
            1,
            Milestone {
                month: payoff.month,
                kind: MilestoneKind::DebtPaidOff {
                    debt_id: payoff.debt_id.clone(),
                    name: payoff.name.clone(),
                },
            },
        )
    }));
    if let Some(snapshot) = result
        .schedule
        .iter()
        .find(|m| m.remaining_total() <= result.starting_balance * 0.5)
    {
        ranked.push((
            2,
            Milestone {
                month: snapshot.month,
                kind: MilestoneKind::HalfwayThere,
            },
        ));
    }
    ranked.push((
        3,
        Milestone {
            month: result.total_months,
            kind: MilestoneKind::DebtFree,
        },
    ));

    ranked.sort_by_key(|(rank, milestone)| (milestone.month, *rank));
    ranked.into_iter().map(|(_, milestone)| milestone).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Debt, Strategy, simulate};

    fn kinds(list: &[Milestone]) -> Vec<(u32, String)> {
        list.iter().map(|m| (m.month, m.achievement_key())).collect()
    }

    #[test]
    fn roll_up_scenario_milestones() {
        let debts = vec![
            Debt::new("a", "Debt A", 300.0, 50.0, 0.0),
            Debt::new("b", "Debt B", 1_000.0, 50.0, 0.0),
        ];
        let result = simulate(&debts, 50.0, Strategy::Snowball, 1200).expect("amortizes");
        let list = milestones(&result);

        // 1300 owed; 650 or less remains after month 5 (1300 - 5 * 150 = 550).
        assert_eq!(
            kinds(&list),
            vec![
                (3, "first-debt-paid".to_string()),
                (3, "debt-paid-off:a".to_string()),
                (5, "halfway-there".to_string()),
                (9, "debt-paid-off:b".to_string()),
                (9, "debt-free".to_string()),
            ]
        );
        assert_eq!(list[1].title(), "Debt A paid off");
    }

    #[test]
    fn halfway_before_the_first_payoff_is_listed_first() {
        let debts = vec![Debt::new("a", "Loan", 1_000.0, 500.0, 0.0)];
        let result = simulate(&debts, 0.0, Strategy::Snowball, 1200).expect("amortizes");
        let list = milestones(&result);
        assert_eq!(
            kinds(&list),
            vec![
                (1, "halfway-there".to_string()),
                (2, "first-debt-paid".to_string()),
                (2, "debt-paid-off:a".to_string()),
                (2, "debt-free".to_string()),
            ]
        );
    }

    #[test]
    fn no_debts_no_milestones() {
        let result = simulate(&[], 0.0, Strategy::Avalanche, 1200).expect("trivial");
        assert!(milestones(&result).is_empty());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let milestone = Milestone {
            month: 4,
            kind: MilestoneKind::DebtPaidOff {
                debt_id: "card".to_string(),
                name: "Card".to_string(),
            },
        };
        let json = serde_json::to_value(&milestone).expect("serializes");
        assert_eq!(json["kind"], "debtPaidOff");
        assert_eq!(json["debtId"], "card");
        assert_eq!(json["month"], 4);
    }
}
