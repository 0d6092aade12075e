pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("Invalid workflow metadata: {0}")]
  InvalidMetadata(String),

  #[error("Invalid workflow submission: {0}")]
  InvalidSubmission(String),

  #[error("Unknown column: {0}")]
  UnknownColumn(String),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Error: {0}")]
  Error(String),
}

impl Error {
  pub fn invalid_metadata<T: ToString>(message: T) -> Self {
    Self::InvalidMetadata(message.to_string())
  }

  pub fn invalid_submission<T: ToString>(message: T) -> Self {
    Self::InvalidSubmission(message.to_string())
  }

  pub fn unknown_column<T: ToString>(key: T) -> Self {
    Self::UnknownColumn(key.to_string())
  }

  pub fn error<T: ToString>(message: T) -> Self {
    Self::Error(message.to_string())
  }
}

// Eq for tests; JSON errors compare by their rendered message
impl PartialEq for Error {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::InvalidMetadata(a), Self::InvalidMetadata(b)) => a == b,
      (Self::InvalidSubmission(a), Self::InvalidSubmission(b)) => a == b,
      (Self::UnknownColumn(a), Self::UnknownColumn(b)) => a == b,
      (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
      (Self::Error(a), Self::Error(b)) => a == b,
      _ => false,
    }
  }
}
