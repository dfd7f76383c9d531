use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TMDb API error: {status_code} - {status_text}")]
    Api { status_code: u16, status_text: String },
}

/// Lookup failures as shown in the error panel. The `Display` text is the
/// user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("TMDb API error: {status_text}")]
    Transport { status_text: String },

    #[error("Couldn't find any movie with that title on TMDb.")]
    NotFound,

    #[error("\"{title}\" was found, but it doesn't have a poster on TMDb.")]
    NoPoster { title: String },

    #[error("Could not search for the movie. Please try a different title.")]
    Unexpected,
}

impl From<TmdbError> for LookupError {
    fn from(err: TmdbError) -> Self {
        match err {
            TmdbError::Api { status_text, .. } => LookupError::Transport { status_text },
            TmdbError::Request(_) | TmdbError::Json(_) => LookupError::Unexpected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_status_text() {
        let err = LookupError::from(TmdbError::Api {
            status_code: 401,
            status_text: "Unauthorized".to_string(),
        });
        assert_eq!(err.to_string(), "TMDb API error: Unauthorized");
    }

    #[test]
    fn test_parse_error_is_generic() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LookupError::from(TmdbError::Json(json_err));
        assert_eq!(err, LookupError::Unexpected);
        assert!(err.to_string().contains("try a different title"));
    }

    #[test]
    fn test_no_poster_names_title() {
        let err = LookupError::NoPoster { title: "Dune".to_string() };
        assert_eq!(err.to_string(), "\"Dune\" was found, but it doesn't have a poster on TMDb.");
    }
}
