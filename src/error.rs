use thiserror::Error;

/// Errors raised by the harvesting core.
///
/// Most world conditions are not errors at all (see the services docs); the
/// only one that unwinds the control loop is [`HarvestError::Stopped`].
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Harvesting stopped")]
    Stopped,

    #[error("Settings store error for {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize run configuration: {0}")]
    Serialize(#[from] serde_yaml_ng::Error),
}

impl HarvestError {
    pub fn is_stopped(&self) -> bool {
        matches!(self, HarvestError::Stopped)
    }
}

pub type HarvestResult<T> = std::result::Result<T, HarvestError>;
