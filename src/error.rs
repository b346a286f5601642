use thiserror::Error;

/// Reasons a sweep request is refused or aborted by the service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    #[error("IP address and subnet are required.")]
    MissingInput,

    #[error("Subnet must be a number like 24.")]
    InvalidPrefix,

    #[error("Invalid IP address or subnet.")]
    InvalidNetwork,

    #[error("Subnet too large ({hosts} hosts). Please use a smaller subnet.")]
    TooLarge { hosts: u128 },

    #[error("Sweep cancelled.")]
    Cancelled,
}

impl SweepError {
    /// Whether the caller sent something unusable, as opposed to the service
    /// giving up.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SweepError::Cancelled)
    }
}
