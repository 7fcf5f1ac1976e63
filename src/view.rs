//! What the bills page shows: rows in display order, or the error text when the fetch failed.

use crate::error::ServiceError;
use crate::model::DisplayBill;

/// Sorts `bills` for display, latest date first. Raw dates are `YYYY-MM-DD`, so they order
/// correctly as strings.
pub fn sort_for_display(bills: &mut [DisplayBill]) {
    bills.sort_by(|a, b| b.bill.date.cmp(&a.bill.date));
}

/// Returns the bills in display order.
pub fn rows(mut bills: Vec<DisplayBill>) -> Vec<DisplayBill> {
    sort_for_display(&mut bills);
    bills
}

/// Renders one line per bill, in the order given: type, name, date, amount and status. Pass the
/// output of `rows` to get the display order.
pub fn render(bills: &[DisplayBill]) -> String {
    bills
        .iter()
        .map(|b| {
            let amount = b
                .bill
                .amount
                .map(|a| format!("{a} €"))
                .unwrap_or_default();
            format!(
                "{} | {} | {} | {} | {}",
                b.bill.expense_type, b.bill.name, b.date, amount, b.status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The text shown in place of the bills when fetching them failed, e.g. `Erreur 404`.
pub fn error_message(e: &anyhow::Error) -> String {
    match e.chain().find_map(|cause| cause.downcast_ref::<ServiceError>()) {
        Some(service_error) => service_error.to_string(),
        None => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixture_bills;
    use anyhow::Context;

    fn displayed() -> Vec<DisplayBill> {
        fixture_bills()
            .into_iter()
            .map(|b| DisplayBill::format(b).unwrap())
            .collect()
    }

    #[test]
    fn test_rows_are_antichronological() {
        let dates: Vec<String> = rows(displayed())
            .into_iter()
            .map(|b| b.bill.date)
            .collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(sorted, dates);
        assert_eq!("2004-04-04", dates[0]);
        assert_eq!("2001-01-01", dates[3]);
    }

    #[test]
    fn test_render() {
        let text = render(&rows(displayed()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(4, lines.len());
        assert_eq!(
            "Hôtel et logement | encore | 4 Avr. 04 | 400 € | En attente",
            lines[0]
        );
        assert!(lines[3].contains("test1"));
    }

    #[test]
    fn test_render_keeps_given_order() {
        let mut bills = rows(displayed());
        bills.reverse();
        let text = render(&bills);
        let names: Vec<&str> = text.lines().map(|l| l.split(" | ").nth(1).unwrap()).collect();
        assert_eq!(vec!["test1", "test2", "test3", "encore"], names);
    }

    #[test]
    fn test_error_message() {
        let e: anyhow::Error = ServiceError::Status(404).into();
        assert_eq!("Erreur 404", error_message(&e));

        let e = Err::<(), _>(ServiceError::Status(500))
            .context("Unable to fetch bills")
            .unwrap_err();
        assert_eq!("Erreur 500", error_message(&e));

        let e = anyhow::anyhow!("connection refused");
        assert_eq!("connection refused", error_message(&e));
    }
}
