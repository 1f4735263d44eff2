use std::path::PathBuf;

use miette::{miette, Result};
use serde::{Deserialize, Serialize};

use super::BasePathsConfiguration;
use crate::configuration::traits::ResolvableConfigurationWithContext;
use crate::impl_record;


#[derive(Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct UnresolvedStorageConfiguration {
    pub database_file_path: String,

    pub cache_size_megabytes: i32,

    pub replica_ports: Vec<i32>,

    pub replication_factor: i8,
}

impl_record!(UnresolvedStorageConfiguration {
    database_file_path: value(default = "{BASE_DATA_DIRECTORY}/store.db"),
    cache_size_megabytes: value(default = "64"),
    replica_ports: value(),
    replication_factor: value(requires = "replica_ports"),
});


#[derive(Serialize, Clone, Debug)]
pub struct StorageConfiguration {
    pub database_file_path: PathBuf,

    pub cache_size_megabytes: u32,

    pub replica_ports: Vec<u16>,

    pub replication_factor: u8,
}


impl ResolvableConfigurationWithContext for UnresolvedStorageConfiguration {
    type Resolved = StorageConfiguration;
    type Context = BasePathsConfiguration;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved> {
        let database_file_path = context.expand_path(&self.database_file_path);

        let cache_size_megabytes = u32::try_from(self.cache_size_megabytes).map_err(|_| {
            miette!(
                "Field cache_size_megabytes must not be negative, got {}.",
                self.cache_size_megabytes
            )
        })?;

        let replica_ports = self
            .replica_ports
            .iter()
            .map(|port| {
                u16::try_from(*port)
                    .ok()
                    .filter(|port| *port != 0)
                    .ok_or_else(|| miette!("Replica port {} is not a valid port.", port))
            })
            .collect::<Result<Vec<_>>>()?;

        let replication_factor = u8::try_from(self.replication_factor).map_err(|_| {
            miette!(
                "Field replication_factor must not be negative, got {}.",
                self.replication_factor
            )
        })?;

        if usize::from(replication_factor) > replica_ports.len() {
            return Err(miette!(
                "Field replication_factor ({}) exceeds the number of replicas ({}).",
                replication_factor,
                replica_ports.len()
            ));
        }


        Ok(Self::Resolved {
            database_file_path,
            cache_size_megabytes,
            replica_ports,
            replication_factor,
        })
    }
}
