//! Construction-time configuration for a singleton registry.
//!
//! The configuration is supplied once, before first access, and is never
//! consulted again after the resource is `Ready`.  With the `serde` feature
//! it can be loaded from any serde format; missing fields take the
//! defaults below.

use std::time::Duration;

use crate::ensure;
use crate::errors::Result;
use crate::kind::StrategyKind;
use crate::resource::Backend;

/// Default resource label.
pub const DEFAULT_LABEL: &str = "primary";

/// Longest artificial construction delay [`RegistryConfig::validate`] accepts.
pub const MAX_CONSTRUCTION_DELAY_MS: u64 = 60_000;

/// Everything needed to build a connection registry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct RegistryConfig {
    label: String,
    backend: Backend,
    strategy: StrategyKind,
    construction_delay_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            backend: Backend::default(),
            strategy: StrategyKind::default(),
            construction_delay_ms: 0,
        }
    }
}

impl RegistryConfig {
    /// Set the resource label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the backend kind.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the initialization strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set an artificial construction delay.
    ///
    /// Delays above [`MAX_CONSTRUCTION_DELAY_MS`] fail validation.
    pub fn with_construction_delay(mut self, delay: Duration) -> Self {
        self.construction_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Resource label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Backend kind.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Initialization strategy.
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Artificial construction delay.
    pub fn construction_delay(&self) -> Duration {
        Duration::from_millis(self.construction_delay_ms)
    }

    /// Check the configuration before it is used to construct anything.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`](crate::Error::InvalidConfig) for a blank
    /// label or a delay above [`MAX_CONSTRUCTION_DELAY_MS`].
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.label.trim().is_empty(), "label must not be empty");
        ensure!(
            self.construction_delay_ms <= MAX_CONSTRUCTION_DELAY_MS,
            "construction delay of {} ms exceeds {MAX_CONSTRUCTION_DELAY_MS} ms",
            self.construction_delay_ms
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn defaults() {
        let cfg = RegistryConfig::default();
        assert_eq!(cfg.label(), "primary");
        assert_eq!(cfg.backend(), Backend::Sql);
        assert_eq!(cfg.strategy(), StrategyKind::OnceGuard);
        assert!(cfg.construction_delay().is_zero());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let cfg = RegistryConfig::default()
            .with_label("analytics")
            .with_backend(Backend::Mongo)
            .with_strategy(StrategyKind::DoubleChecked)
            .with_construction_delay(Duration::from_millis(15));
        assert_eq!(cfg.label(), "analytics");
        assert_eq!(cfg.backend(), Backend::Mongo);
        assert_eq!(cfg.strategy(), StrategyKind::DoubleChecked);
        assert_eq!(cfg.construction_delay(), Duration::from_millis(15));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let empty = RegistryConfig::default().with_label("");
        assert!(matches!(empty.validate(), Err(Error::InvalidConfig(_))));

        let slow = RegistryConfig::default().with_construction_delay(Duration::from_secs(120));
        assert!(matches!(slow.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn delay_cap_is_inclusive() {
        let at_cap = RegistryConfig::default()
            .with_construction_delay(Duration::from_millis(MAX_CONSTRUCTION_DELAY_MS));
        assert!(at_cap.validate().is_ok());

        let over = RegistryConfig::default()
            .with_construction_delay(Duration::from_millis(MAX_CONSTRUCTION_DELAY_MS + 1));
        assert_eq!(
            over.validate().unwrap_err(),
            Error::InvalidConfig("construction delay of 60001 ms exceeds 60000 ms".into())
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_with_defaults() {
        let cfg: RegistryConfig =
            serde_json::from_str(r#"{"label":"reports","strategy":"double_checked"}"#).unwrap();
        assert_eq!(cfg.label(), "reports");
        assert_eq!(cfg.strategy(), StrategyKind::DoubleChecked);
        assert_eq!(cfg.backend(), Backend::Sql);

        let numeric: RegistryConfig =
            serde_json::from_str(r#"{"backend":{"numeric":1}}"#).unwrap();
        assert_eq!(numeric.backend(), Backend::Numeric(1));

        assert!(serde_json::from_str::<RegistryConfig>(r#"{"lable":"x"}"#).is_err());
    }
}
