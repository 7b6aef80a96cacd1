use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures are fatal at this tier: setup errors abort initialization and
/// per-frame errors end the session. Nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    #[cfg(windows)]
    #[error("graphics device failure: {0}")]
    Device(#[from] windows::core::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_carry_their_message() {
        let err = Error::Config("--width expects a number".into());
        assert!(err.to_string().contains("--width"));
    }
}
