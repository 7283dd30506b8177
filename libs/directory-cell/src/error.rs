use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Clinic API request failed: {0}")]
    Transport(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to parse clinic API response: {0}")]
    Parse(String),
}

impl DirectoryError {
    /// True for failures where the clinic API could not be reached or did
    /// not answer with a usable response. A `status=false` reply is an
    /// answer and is not counted.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, DirectoryError::Rejected(_))
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DirectoryError::Parse(err.to_string())
        } else {
            DirectoryError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_is_not_an_outage() {
        assert!(!DirectoryError::Rejected("No doctors found".to_string()).is_unavailable());
        assert!(DirectoryError::Transport("refused".to_string()).is_unavailable());
        assert!(DirectoryError::Status { status: 503, message: "down".to_string() }.is_unavailable());
        assert!(DirectoryError::Parse("eof".to_string()).is_unavailable());
    }
}
