pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// A failure reported by the remote bills service.
///
/// The `Display` text is what the bills page shows to the user, e.g. `Erreur 404`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service answered with a non-success HTTP status.
    #[error("Erreur {0}")]
    Status(u16),
    /// The response could not be read as the expected type.
    #[error("Erreur de lecture de la réponse: {0}")]
    Decode(String),
}

#[test]
fn test_service_error_message() {
    assert_eq!("Erreur 404", ServiceError::Status(404).to_string());
    assert_eq!("Erreur 500", ServiceError::Status(500).to_string());
    assert!(ServiceError::Decode("expected value".into())
        .to_string()
        .starts_with("Erreur de lecture"));
}
