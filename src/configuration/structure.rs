use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};

pub use self::base_paths::{
    BasePathsConfiguration,
    UnresolvedBasePathsConfiguration,
    BASE_DATA_DIRECTORY_PLACEHOLDER,
};
pub use self::logging::{LoggingConfiguration, UnresolvedLoggingConfiguration};
pub use self::server::{
    ServerConfiguration,
    TlsConfiguration,
    UnresolvedServerConfiguration,
    UnresolvedTlsConfiguration,
};
pub use self::storage::{StorageConfiguration, UnresolvedStorageConfiguration};
use super::traits::{ResolvableConfiguration, ResolvableConfigurationWithContext};
use super::utilities::{get_default_configuration_file_path, load_record_from_path};
use crate::impl_record;

mod base_paths;
mod logging;
mod server;
mod storage;



/// The service configuration as written in the file, before validation and resolution.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct UnresolvedConfiguration {
    /// Base paths.
    pub base_paths: UnresolvedBasePathsConfiguration,

    /// Network server configuration.
    pub server: UnresolvedServerConfiguration,

    /// Logging-related configuration.
    pub logging: UnresolvedLoggingConfiguration,

    /// Storage configuration.
    pub storage: UnresolvedStorageConfiguration,
}

impl_record!(UnresolvedConfiguration {
    base_paths: record(required = "true"),
    server: record(),
    logging: record(),
    storage: record(),
});


/// The entire configuration.
#[derive(Serialize, Debug, Clone)]
pub struct Configuration {
    /// This is the file path this `Config` instance was loaded from.
    pub file_path: PathBuf,

    /// Base paths
    pub base_paths: BasePathsConfiguration,

    /// Network server configuration.
    pub server: ServerConfiguration,

    /// Logging-related configuration.
    pub logging: LoggingConfiguration,

    /// Storage configuration.
    pub storage: StorageConfiguration,
}


impl ResolvableConfigurationWithContext for UnresolvedConfiguration {
    type Resolved = Configuration;
    type Context = PathBuf;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved> {
        let base_paths = self
            .base_paths
            .resolve()
            .wrap_err("Failed to resolve base_paths table.")?;

        let server = self
            .server
            .resolve(base_paths.clone())
            .wrap_err("Failed to resolve server table.")?;

        let logging = self
            .logging
            .resolve()
            .wrap_err("Failed to resolve logging table.")?;

        let storage = self
            .storage
            .resolve(base_paths.clone())
            .wrap_err("Failed to resolve storage table.")?;


        Ok(Configuration {
            file_path: context,
            base_paths,
            server,
            logging,
            storage,
        })
    }
}


impl Configuration {
    /// Load the configuration from a specific file path.
    ///
    /// The file is parsed, defaults are applied and validated, and the result
    /// is resolved into a [`Configuration`].
    pub fn load_from_path<S: AsRef<Path>>(configuration_file_path: S) -> Result<Self> {
        let unresolved_configuration =
            load_record_from_path::<UnresolvedConfiguration, _>(configuration_file_path.as_ref())
                .wrap_err("Could not load configuration file!")?;


        let configuration_file_path = dunce::canonicalize(configuration_file_path)
            .into_diagnostic()
            .wrap_err("Could not canonicalize configuration file path!")?;

        let resolved_configuration = unresolved_configuration
            .resolve(configuration_file_path)
            .wrap_err("Failed to resolve configuration.")?;

        Ok(resolved_configuration)
    }

    /// Load the configuration from the default path (`./data/configuration.toml`).
    pub fn load_from_default_path() -> Result<Configuration> {
        Configuration::load_from_path(
            get_default_configuration_file_path()
                .wrap_err_with(|| "Could not load configuration file at default path.")?,
        )
    }

    /// Serialize the resolved configuration back into TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .into_diagnostic()
            .wrap_err("Could not serialize configuration.")
    }
}
