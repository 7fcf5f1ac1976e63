use crate::api::{bills_service, Mode};
use crate::commands::{load_session, Out};
use crate::model::DisplayBill;
use crate::report::TracingReporter;
use crate::ui::LogNavigator;
use crate::workflow::Bills;
use crate::{view, Config, Result};

/// Fetches the bills of the session user and returns them most recent first.
///
/// # Errors
/// - Returns an error if there is no session.
/// - Returns an error whose message is the text the bills page shows (e.g. `Erreur 404`) if the
///   bills cannot be fetched.
pub async fn bills(config: Config, mode: Mode) -> Result<Out<Vec<DisplayBill>>> {
    let session = load_session(&config).await?;
    let store = bills_service(&config, &session, mode)?;
    let mut page = Bills::new(
        store,
        session,
        Box::new(LogNavigator),
        Box::new(TracingReporter),
    );
    let bills = page
        .get_bills()
        .await
        .map_err(|e| anyhow::anyhow!(view::error_message(&e)))?;
    let rows = view::rows(bills);
    let message = if rows.is_empty() {
        "Aucune note de frais".to_string()
    } else {
        format!("Mes notes de frais\n{}", view::render(&rows))
    };
    Ok(Out::new(message, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_bills_in_test_mode() {
        let env = TestEnv::new().await;
        let out = bills(env.config(), Mode::Test).await.unwrap();
        assert!(out.message().starts_with("Mes notes de frais"));
        for name in ["encore", "test1", "test2", "test3"] {
            assert!(out.message().contains(name));
        }
        let rows = out.structure().unwrap();
        let dates: Vec<&str> = rows.iter().map(|b| b.bill.date.as_str()).collect();
        assert_eq!(
            vec!["2004-04-04", "2003-03-03", "2002-02-02", "2001-01-01"],
            dates
        );
    }

    #[tokio::test]
    async fn test_bills_without_session() {
        let env = TestEnv::without_session().await;
        assert!(bills(env.config(), Mode::Test).await.is_err());
    }
}
