use std::path::PathBuf;

use miette::{miette, Result};
use serde::{Deserialize, Serialize};

use super::base_paths::BasePathsConfiguration;
use crate::configuration::traits::ResolvableConfigurationWithContext;
use crate::impl_record;


#[derive(Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct UnresolvedTlsConfiguration {
    pub certificate_file_path: String,

    pub private_key_file_path: String,
}

// A certificate is useless without its key and vice versa.
impl_record!(UnresolvedTlsConfiguration {
    certificate_file_path: value(requires = "private_key_file_path"),
    private_key_file_path: value(requires = "certificate_file_path"),
});


#[derive(Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct UnresolvedServerConfiguration {
    pub host: String,

    pub port: i32,

    pub worker_threads: i16,

    pub request_timeout_seconds: f64,

    pub allowed_origins: Vec<String>,

    pub tls: UnresolvedTlsConfiguration,
}

impl_record!(UnresolvedServerConfiguration {
    host: value(default = "127.0.0.1"),
    port: value(default = "8080"),
    worker_threads: value(default = "4"),
    request_timeout_seconds: value(default = "30.0"),
    allowed_origins: value(default = "{http://localhost}"),
    tls: record(),
});


#[derive(Serialize, Clone, Debug)]
pub struct TlsConfiguration {
    pub certificate_file_path: PathBuf,

    pub private_key_file_path: PathBuf,
}

#[derive(Serialize, Clone, Debug)]
pub struct ServerConfiguration {
    pub host: String,

    pub port: u16,

    pub worker_threads: usize,

    pub request_timeout_seconds: f64,

    pub allowed_origins: Vec<String>,

    /// `None` if the TLS table is empty.
    pub tls: Option<TlsConfiguration>,
}


impl ResolvableConfigurationWithContext for UnresolvedServerConfiguration {
    type Resolved = ServerConfiguration;
    type Context = BasePathsConfiguration;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved> {
        let port = u16::try_from(self.port)
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| miette!("Field port must be between 1 and 65535, got {}.", self.port))?;

        let worker_threads = usize::try_from(self.worker_threads)
            .ok()
            .filter(|threads| *threads > 0)
            .ok_or_else(|| {
                miette!(
                    "Field worker_threads must be positive, got {}.",
                    self.worker_threads
                )
            })?;

        if !self.request_timeout_seconds.is_finite() || self.request_timeout_seconds <= 0.0 {
            return Err(miette!(
                "Field request_timeout_seconds must be a positive number of seconds, got {}.",
                self.request_timeout_seconds
            ));
        }


        // Validation guarantees that either both paths are set or neither is.
        let tls = if self.tls.certificate_file_path.is_empty() {
            None
        } else {
            Some(TlsConfiguration {
                certificate_file_path: context.expand_path(&self.tls.certificate_file_path),
                private_key_file_path: context.expand_path(&self.tls.private_key_file_path),
            })
        };


        Ok(Self::Resolved {
            host: self.host,
            port,
            worker_threads,
            request_timeout_seconds: self.request_timeout_seconds,
            allowed_origins: self.allowed_origins,
            tls,
        })
    }
}
