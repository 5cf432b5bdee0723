use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Gemini API error: {0}")]
    Gemini(String),

    #[error("Gemini API Key is not configured on the server.")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_into_miette_report() {
        // cli::run bubbles these up with `?` into a miette::Result
        let report: miette::Report = Error::MissingApiKey.into();
        assert!(report.to_string().contains("not configured"));

        let report: miette::Report = Error::Server("bind failed".to_string()).into();
        assert!(report.to_string().contains("bind failed"));
    }
}
