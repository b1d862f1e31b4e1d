//! Harness configuration and backend capabilities.
//!
//! Per Iron Lotus Framework: Configuration is validated at load time (Poka-Yoke).
//!
//! The only behavior a backend can change is whether [`crate::Harness::compare`]
//! tolerates a missing `EV_ADD` echo. That tolerance is a named capability
//! ([`Quirks`]) chosen per [`Backend`], and it can be overridden explicitly
//! from a config file. Without either, comparison is strict: the backend
//! detected from the build target selects which queue to open, never which
//! tolerances apply.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Queue implementation under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// FreeBSD kernel kqueue.
    FreebsdKernel,
    /// macOS / Darwin kernel kqueue.
    DarwinKernel,
    /// libkqueue userspace emulation.
    Libkqueue,
    /// In-process [`crate::MemoryQueue`].
    Memory,
}

impl Backend {
    /// Picks the backend native to the build target.
    ///
    /// Targets without a kernel kqueue fall back to [`Backend::Memory`].
    #[must_use]
    pub fn detect() -> Self {
        if cfg!(target_os = "freebsd") {
            Self::FreebsdKernel
        } else if cfg!(target_os = "macos") {
            Self::DarwinKernel
        } else {
            Self::Memory
        }
    }

    /// Returns the backend name as used in config files.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FreebsdKernel => "freebsd-kernel",
            Self::DarwinKernel => "darwin-kernel",
            Self::Libkqueue => "libkqueue",
            Self::Memory => "memory",
        }
    }

    /// Whether delivered events carry `EV_ADD` when it was registered.
    ///
    /// The FreeBSD kernel strips it; the others echo it back.
    #[must_use]
    pub const fn echoes_add_flag(&self) -> bool {
        !matches!(self, Self::FreebsdKernel)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tolerated backend inconsistencies.
///
/// The default is strict: nothing is tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quirks {
    normalize_add_flag: bool,
}

impl Quirks {
    /// No tolerances.
    pub const STRICT: Self = Self {
        normalize_add_flag: false,
    };

    /// Tolerances documented for `backend`.
    #[must_use]
    pub const fn for_backend(backend: Backend) -> Self {
        Self {
            normalize_add_flag: !backend.echoes_add_flag(),
        }
    }

    /// Whether comparison copies `EV_ADD` from the expected record.
    #[must_use]
    pub const fn normalize_add_flag(&self) -> bool {
        self.normalize_add_flag
    }

    /// Sets the `EV_ADD` normalization capability.
    #[must_use]
    pub const fn with_normalize_add_flag(mut self, value: bool) -> Self {
        self.normalize_add_flag = value;
        self
    }
}

/// Harness configuration.
///
/// ```toml
/// backend = "freebsd-kernel"   # optional, enables its documented quirks
/// normalize_add_flag = false   # optional override
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Queue implementation under test, if named.
    #[serde(default)]
    pub backend: Option<Backend>,

    /// Explicit override of the backend's `EV_ADD` capability.
    #[serde(default)]
    pub normalize_add_flag: Option<bool>,
}

impl HarnessConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> HarnessConfigBuilder {
        HarnessConfigBuilder::new()
    }

    /// Queue implementation to open: the named one, else [`Backend::detect`].
    #[must_use]
    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or_else(Backend::detect)
    }

    /// Effective tolerances: the override if set, else those of the named
    /// backend. An unnamed backend is strict.
    #[must_use]
    pub fn quirks(&self) -> Quirks {
        let quirks = self.backend.map_or(Quirks::STRICT, Quirks::for_backend);
        match self.normalize_add_flag {
            Some(value) => quirks.with_normalize_add_flag(value),
            None => quirks,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is inconsistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // The memory queue always echoes EV_ADD; normalizing it would hide bugs.
        if self.backend() == Backend::Memory && self.normalize_add_flag == Some(true) {
            return Err(ConfigError::invalid(
                "normalize_add_flag cannot be enabled for the memory backend",
            ));
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns an error if the document cannot be parsed or is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }
}

/// Builder for [`HarnessConfig`].
#[derive(Debug, Clone)]
pub struct HarnessConfigBuilder {
    config: HarnessConfig,
}

impl HarnessConfigBuilder {
    /// Create a new builder with nothing named.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HarnessConfig::default(),
        }
    }

    /// Queue implementation under test, with its documented quirks.
    ///
    /// Default: unset ([`Backend::detect`], strict)
    #[must_use]
    pub const fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = Some(backend);
        self
    }

    /// Override the backend's `EV_ADD` capability.
    ///
    /// Default: unset
    #[must_use]
    pub const fn normalize_add_flag(mut self, value: bool) -> Self {
        self.config.normalize_add_flag = Some(value);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> HarnessConfig {
        self.config
    }
}

impl Default for HarnessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
