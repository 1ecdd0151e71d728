use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http transport error: {0}")]
    Http(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Map an HTTP response status to the matching variant.
    /// Unrecognized statuses fall through to `Api` with the raw code.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => AppError::BadRequest(message),
            401 => AppError::Unauthorized,
            403 => AppError::Forbidden,
            404 => AppError::NotFound,
            _ => AppError::Api { status, message },
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Unauthorized => 401,
            AppError::Forbidden => 403,
            AppError::NotFound => 404,
            AppError::Api { status, .. } => *status,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_known_codes() {
        assert!(matches!(
            AppError::from_status(401, "nope".into()),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from_status(404, "gone".into()),
            AppError::NotFound
        ));
        match AppError::from_status(503, "maintenance".into()) {
            AppError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_status_code_round_trips() {
        assert_eq!(AppError::Forbidden.status_code(), 403);
        assert_eq!(
            AppError::Api {
                status: 429,
                message: "slow down".into()
            }
            .status_code(),
            429
        );
        assert_eq!(AppError::Config("missing".into()).status_code(), 500);
    }
}
