//! Driven port reporting whether the backing store can serve requests.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Reason the store is not currently usable.
    pub enum StoreProbeError {
        /// No connection could be obtained or the round trip failed.
        Unreachable { message: String } => "store unreachable: {message}",
    }
}

/// Cheap connectivity check used by the readiness probe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreProbe: Send + Sync {
    /// Perform one round trip against the store.
    async fn ping(&self) -> Result<(), StoreProbeError>;
}
