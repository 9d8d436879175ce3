use std::time::Duration;

use super::transport::{ServiceDirectory, SidecarEndpoint, Transport, TransportMode};

/// Settings for outbound service invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    /// Direct HTTP or sidecar-mediated calls.
    pub mode: TransportMode,
    /// Per-service base URLs and app ids.
    pub directory: ServiceDirectory,
    /// Sidecar address, used only in sidecar mode.
    pub sidecar: SidecarEndpoint,
    /// Client-level timeout applied to every outbound call.
    pub timeout: Duration,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::Direct,
            directory: ServiceDirectory::default(),
            sidecar: SidecarEndpoint::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl InvocationConfig {
    #[must_use]
    pub fn transport(&self) -> Transport {
        Transport::new(self.mode, self.directory.clone(), self.sidecar.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_config_defaults() {
        let config = InvocationConfig::default();
        assert_eq!(config.mode, TransportMode::Direct);
        assert_eq!(config.sidecar.base_url(), "http://localhost:3500");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.transport().mode(), TransportMode::Direct);
    }
}
