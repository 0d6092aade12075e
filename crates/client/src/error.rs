use reqwest::StatusCode;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
  #[error("Transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Decode error: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("Config error: {0}")]
  Config(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("{0}")]
  Dashboard(#[from] cromwell_dashboard::Error),

  #[error("Unexpected status {status}: {message}")]
  UnexpectedStatus { status: StatusCode, message: String },
}

impl ClientError {
  pub fn config_error<T: ToString>(message: T) -> Self {
    Self::Config(message.to_string())
  }

  pub fn unexpected_status<T: ToString>(status: StatusCode, message: T) -> Self {
    Self::UnexpectedStatus {
      status,
      message: message.to_string(),
    }
  }

  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::UnexpectedStatus { status, .. } => Some(*status),
      Self::Transport(err) => err.status(),
      _ => None,
    }
  }
}
