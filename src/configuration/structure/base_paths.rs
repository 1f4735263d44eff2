use std::path::PathBuf;

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};

use crate::configuration::{
    traits::ResolvableConfiguration,
    utilities::expand_path_placeholders,
};
use crate::impl_record;


/// Placeholder that other path fields may use to refer to the base data directory.
pub const BASE_DATA_DIRECTORY_PLACEHOLDER: &str = "{BASE_DATA_DIRECTORY}";


#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct UnresolvedBasePathsConfiguration {
    pub base_data_directory_path: String,
}

impl_record!(UnresolvedBasePathsConfiguration {
    base_data_directory_path: value(required = "true"),
});


#[derive(Serialize, Debug, Clone)]
pub struct BasePathsConfiguration {
    /// Canonical path of an existing directory.
    pub base_data_directory_path: PathBuf,
}

impl ResolvableConfiguration for UnresolvedBasePathsConfiguration {
    type Resolved = BasePathsConfiguration;

    fn resolve(self) -> Result<Self::Resolved> {
        // Loading a configuration never touches the filesystem beyond reading it,
        // so the directory has to exist already.
        let base_data_directory_path = dunce::canonicalize(&self.base_data_directory_path)
            .into_diagnostic()
            .wrap_err_with(|| {
                miette!(
                    "Field base_data_directory_path points to {}, which does not exist.",
                    self.base_data_directory_path
                )
            })?;

        if !base_data_directory_path.is_dir() {
            return Err(miette!(
                "Field base_data_directory_path points to {}, which is not a directory.",
                base_data_directory_path.display()
            ));
        }

        Ok(BasePathsConfiguration {
            base_data_directory_path,
        })
    }
}


impl BasePathsConfiguration {
    /// Expand the `{BASE_DATA_DIRECTORY}` placeholder in a raw path field.
    pub fn expand_path(&self, raw_path: &str) -> PathBuf {
        let base_data_directory = self.base_data_directory_path.to_string_lossy();

        expand_path_placeholders(
            raw_path,
            &[(BASE_DATA_DIRECTORY_PLACEHOLDER, base_data_directory.as_ref())],
        )
    }
}
