use std::cmp::Ordering;

use super::types::{Debt, Strategy};

/// Returns the debts in processing order for `strategy`. Ties keep their
/// input order.
pub fn order_debts(debts: &[Debt], strategy: Strategy) -> Vec<Debt> {
    let mut ordered = debts.to_vec();
    ordered.sort_by(comparator(strategy));
    ordered
}

pub fn comparator(strategy: Strategy) -> fn(&Debt, &Debt) -> Ordering {
    match strategy {
        Strategy::Snowball => by_balance_ascending,
        Strategy::Avalanche => by_rate_descending,
    }
}

fn by_balance_ascending(a: &Debt, b: &Debt) -> Ordering {
    a.balance.total_cmp(&b.balance)
}

fn by_rate_descending(a: &Debt, b: &Debt) -> Ordering {
    b.interest_rate.total_cmp(&a.interest_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(debts: &[Debt]) -> Vec<&str> {
        debts.iter().map(|d| d.id.as_str()).collect()
    }

    fn sample_debts() -> Vec<Debt> {
        vec![
            Debt::new("card", "Credit card", 4_500.0, 90.0, 22.9),
            Debt::new("car", "Car loan", 9_800.0, 280.0, 6.5),
            Debt::new("medical", "Medical bill", 600.0, 25.0, 0.0),
            Debt::new("store", "Store card", 1_200.0, 40.0, 22.9),
        ]
    }

    #[test]
    fn snowball_orders_by_smallest_balance() {
        let ordered = order_debts(&sample_debts(), Strategy::Snowball);
        assert_eq!(ids(&ordered), vec!["medical", "store", "card", "car"]);
    }

    #[test]
    fn avalanche_orders_by_highest_rate_keeping_ties_stable() {
        let ordered = order_debts(&sample_debts(), Strategy::Avalanche);
        assert_eq!(ids(&ordered), vec!["card", "store", "car", "medical"]);
    }

    #[test]
    fn snowball_ties_keep_input_order() {
        let debts = vec![
            Debt::new("b", "B", 500.0, 10.0, 5.0),
            Debt::new("a", "A", 500.0, 10.0, 9.0),
            Debt::new("c", "C", 100.0, 10.0, 1.0),
        ];
        let ordered = order_debts(&debts, Strategy::Snowball);
        assert_eq!(ids(&ordered), vec!["c", "b", "a"]);
    }

    #[test]
    fn ordering_does_not_mutate_input() {
        let debts = sample_debts();
        let before = debts.clone();
        let _ = order_debts(&debts, Strategy::Avalanche);
        assert_eq!(debts, before);
    }

    #[test]
    fn empty_input_yields_empty_order() {
        assert!(order_debts(&[], Strategy::Snowball).is_empty());
    }
}
