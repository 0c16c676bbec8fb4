//! Container settings.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Default limit on nested constructions per request.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Tunables of a built container.
///
/// # Examples
///
/// ```rust
/// use bindweave::{ContainerBuilder, ContainerSettings};
///
/// let settings = ContainerSettings::default()
///     .with_max_depth(32)
///     .with_fail_fast(true);
///
/// let mut builder = ContainerBuilder::new();
/// builder.with_settings(settings);
/// let container = builder.build();
/// assert_eq!(container.settings().max_depth, 32);
/// assert!(container.settings().fail_fast);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerSettings {
    /// Nested constructions allowed below one top-level request.
    /// Zero is raised to 1 when the container is built.
    pub max_depth: usize,
    /// Stop validation at the first failing eager provider
    pub fail_fast: bool,
    /// Report contracts with several providers as validation warnings
    pub warn_on_ambiguous: bool,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            fail_fast: false,
            warn_on_ambiguous: true,
        }
    }
}

impl ContainerSettings {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_ambiguity_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_ambiguous = enabled;
        self
    }

    /// Parses settings from JSON; missing fields take their defaults.
    ///
    /// ```rust
    /// # #[cfg(feature = "config")]
    /// # {
    /// use bindweave::ContainerSettings;
    ///
    /// let settings = ContainerSettings::from_json_str(r#"{ "max_depth": 8 }"#).unwrap();
    /// assert_eq!(settings.max_depth, 8);
    /// assert!(!settings.fail_fast);
    /// # }
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        let max_depth = settings.max_depth;
        Ok(settings.with_max_depth(max_depth))
    }

    #[cfg(feature = "config")]
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_depth_is_clamped() {
        assert_eq!(ContainerSettings::default().with_max_depth(0).max_depth, 1);
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_round_trip_keeps_overrides() {
        let settings = ContainerSettings::default().with_fail_fast(true);
        let json = settings.to_json_string().unwrap();
        assert_eq!(ContainerSettings::from_json_str(&json).unwrap(), settings);
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_zero_depth_is_clamped() {
        let settings = ContainerSettings::from_json_str(r#"{ "max_depth": 0, "fail_fast": true }"#).unwrap();
        assert_eq!(settings.max_depth, 1);
        assert!(settings.fail_fast);
        assert!(settings.warn_on_ambiguous);
    }
}
