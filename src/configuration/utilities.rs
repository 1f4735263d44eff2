use std::{env::current_dir, fs, path::Path, path::PathBuf};

use miette::{miette, Context, IntoDiagnostic, Report, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{validate, Record};


/// Returns the default configuration filepath, which is at
/// `{current directory}/data/configuration.toml`.
pub fn get_default_configuration_file_path() -> Result<PathBuf> {
    let mut configuration_filepath = current_dir()
        .into_diagnostic()
        .wrap_err_with(|| miette!("Could not get the current directory."))?;
    configuration_filepath.push("data/configuration.toml");

    if !configuration_filepath.exists() {
        return Err(miette!(
            "Could not find configuration.toml in data directory (expected it at {}).",
            configuration_filepath.display()
        ));
    }

    Ok(configuration_filepath)
}


/// Deserialize a TOML string into the record `R`, then apply its defaults
/// and validate it.
///
/// Keys missing from the TOML document are expected to fall back to their zero
/// value (e.g. by deriving `Default` and marking the type with `#[serde(default)]`).
pub fn load_record_from_str<R>(configuration_string: &str) -> Result<R>
where
    R: Record + DeserializeOwned,
{
    let mut record = toml::from_str::<R>(configuration_string)
        .into_diagnostic()
        .wrap_err("Could not parse configuration!")?;

    validate(&mut record)
        .map_err(Report::new)
        .wrap_err_with(|| miette!("Configuration record {} is invalid.", record.record_name()))?;

    debug!(record = record.record_name(), "Configuration record validated.");

    Ok(record)
}

/// Read a TOML file into the record `R`, then apply its defaults and validate it.
pub fn load_record_from_path<R, S>(configuration_file_path: S) -> Result<R>
where
    R: Record + DeserializeOwned,
    S: AsRef<Path>,
{
    let configuration_file_path = configuration_file_path.as_ref();

    let configuration_string = fs::read_to_string(configuration_file_path)
        .into_diagnostic()
        .wrap_err_with(|| {
            miette!(
                "Could not read configuration file at {}.",
                configuration_file_path.display()
            )
        })?;

    load_record_from_str(&configuration_string).wrap_err_with(|| {
        miette!(
            "Could not load configuration file at {}.",
            configuration_file_path.display()
        )
    })
}


/// Replace every `(placeholder, value)` pair in `raw_path`, in order.
#[must_use = "function returns the expanded path"]
pub fn expand_path_placeholders(raw_path: &str, placeholders: &[(&str, &str)]) -> PathBuf {
    let expanded = placeholders
        .iter()
        .fold(raw_path.to_string(), |path, (placeholder, value)| {
            path.replace(placeholder, value)
        });

    PathBuf::from(expanded)
}



#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::impl_record;

    #[derive(Deserialize, Default, Debug)]
    #[serde(default)]
    struct Limits {
        max_connections: i16,
        ratio: f32,
        name: String,
    }

    impl_record!(Limits {
        max_connections: value(default = "128"),
        ratio: value(default = "0.5"),
        name: value(required = "true"),
    });

    #[test]
    fn missing_keys_receive_defaults() {
        let limits: Limits = load_record_from_str("name = \"primary\"").unwrap();

        assert_eq!(limits.max_connections, 128);
        assert_eq!(limits.ratio, 0.5);
        assert_eq!(limits.name, "primary");
    }

    #[test]
    fn present_keys_are_kept() {
        let limits: Limits =
            load_record_from_str("name = \"a\"\nmax_connections = 4\nratio = 2.0").unwrap();

        assert_eq!(limits.max_connections, 4);
        assert_eq!(limits.ratio, 2.0);
    }

    #[test]
    fn validation_errors_are_reported() {
        let error = load_record_from_str::<Limits>("max_connections = 3").unwrap_err();
        let validation_error = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<crate::ValidationError>());

        assert!(matches!(
            validation_error,
            Some(crate::ValidationError::RequiredMissing { field, .. }) if field == "name"
        ));
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(load_record_from_str::<Limits>("name = ").is_err());
    }

    #[test]
    fn placeholders_are_expanded() {
        assert_eq!(
            expand_path_placeholders(
                "{BASE_DATA_DIRECTORY}/{NAME}.db",
                &[("{BASE_DATA_DIRECTORY}", "/srv/data"), ("{NAME}", "store")]
            ),
            PathBuf::from("/srv/data/store.db")
        );

        assert_eq!(
            expand_path_placeholders("relative/store.db", &[("{BASE_DATA_DIRECTORY}", "/srv")]),
            PathBuf::from("relative/store.db")
        );
    }
}
