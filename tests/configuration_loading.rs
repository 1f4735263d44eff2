use std::fs;
use std::path::Path;

use confcheck::configuration::Configuration;
use confcheck::ValidationError;
use tempfile::TempDir;


fn write_configuration(directory: &TempDir, contents: &str) -> std::path::PathBuf {
    let configuration_file_path = directory.path().join("configuration.toml");
    fs::write(&configuration_file_path, contents).unwrap();
    configuration_file_path
}

fn base_data_section(data_directory: &Path) -> String {
    fs::create_dir_all(data_directory).unwrap();

    format!(
        "[base_paths]\nbase_data_directory_path = {:?}\n",
        data_directory.to_string_lossy()
    )
}

fn find_validation_error(report: &miette::Report) -> Option<&ValidationError> {
    report
        .chain()
        .find_map(|cause| cause.downcast_ref::<ValidationError>())
}


#[test]
fn minimal_configuration_receives_defaults() {
    let directory = TempDir::new().unwrap();
    let data_directory = directory.path().join("data");

    let configuration_file_path =
        write_configuration(&directory, &base_data_section(&data_directory));

    let configuration = Configuration::load_from_path(&configuration_file_path).unwrap();

    assert!(data_directory.is_dir());
    assert_eq!(configuration.server.host, "127.0.0.1");
    assert_eq!(configuration.server.port, 8080);
    assert_eq!(configuration.server.worker_threads, 4);
    assert_eq!(configuration.server.request_timeout_seconds, 30.0);
    assert_eq!(
        configuration.server.allowed_origins,
        vec!["http://localhost".to_string()]
    );
    assert!(configuration.server.tls.is_none());

    assert_eq!(configuration.logging.console_output_level_filter, "info");

    assert_eq!(configuration.storage.cache_size_megabytes, 64);
    assert_eq!(
        configuration.storage.database_file_path,
        configuration
            .base_paths
            .base_data_directory_path
            .join("store.db")
    );
}

#[test]
fn explicit_values_override_defaults() {
    let directory = TempDir::new().unwrap();
    let data_directory = directory.path().join("data");

    let contents = format!(
        "{}
[server]
port = 9000
allowed_origins = [\"https://example.invalid\"]

[server.tls]
certificate_file_path = \"{{BASE_DATA_DIRECTORY}}/server.crt\"
private_key_file_path = \"{{BASE_DATA_DIRECTORY}}/server.key\"

[storage]
replica_ports = [9101, 9102]
replication_factor = 2
",
        base_data_section(&data_directory)
    );

    let configuration_file_path = write_configuration(&directory, &contents);
    let configuration = Configuration::load_from_path(&configuration_file_path).unwrap();

    assert_eq!(configuration.server.port, 9000);
    assert_eq!(
        configuration.server.allowed_origins,
        vec!["https://example.invalid".to_string()]
    );

    let tls = configuration.server.tls.as_ref().unwrap();
    assert_eq!(
        tls.certificate_file_path,
        configuration
            .base_paths
            .base_data_directory_path
            .join("server.crt")
    );

    assert_eq!(configuration.storage.replica_ports, vec![9101, 9102]);
    assert_eq!(configuration.storage.replication_factor, 2);

    let printed = configuration.to_toml_string().unwrap();
    assert!(printed.contains("port = 9000"));
}

#[test]
fn missing_base_paths_table_is_rejected() {
    let directory = TempDir::new().unwrap();
    let configuration_file_path = write_configuration(&directory, "[server]\nport = 1\n");

    let report = Configuration::load_from_path(&configuration_file_path).unwrap_err();

    assert!(matches!(
        find_validation_error(&report),
        Some(ValidationError::RequiredMissing { field, .. })
            if field == "base_paths.base_data_directory_path"
    ));
}

#[test]
fn half_configured_tls_is_rejected() {
    let directory = TempDir::new().unwrap();
    let data_directory = directory.path().join("data");

    let contents = format!(
        "{}\n[server.tls]\ncertificate_file_path = \"server.crt\"\n",
        base_data_section(&data_directory)
    );

    let configuration_file_path = write_configuration(&directory, &contents);
    let report = Configuration::load_from_path(&configuration_file_path).unwrap_err();

    assert!(matches!(
        find_validation_error(&report),
        Some(ValidationError::DependencyUnmet { field, dependency })
            if field == "server.tls.certificate_file_path"
                && dependency == "server.tls.private_key_file_path"
    ));
}

#[test]
fn replication_factor_requires_replicas() {
    let directory = TempDir::new().unwrap();
    let data_directory = directory.path().join("data");

    let contents = format!(
        "{}\n[storage]\nreplication_factor = 3\n",
        base_data_section(&data_directory)
    );

    let configuration_file_path = write_configuration(&directory, &contents);
    let report = Configuration::load_from_path(&configuration_file_path).unwrap_err();

    assert!(matches!(
        find_validation_error(&report),
        Some(ValidationError::DependencyUnmet { dependency, .. })
            if dependency == "storage.replica_ports"
    ));
}

#[test]
fn invalid_log_filter_fails_resolution() {
    let directory = TempDir::new().unwrap();
    let data_directory = directory.path().join("data");

    let contents = format!(
        "{}\n[logging]\nconsole_output_level_filter = \"confcheck=loudest\"\n",
        base_data_section(&data_directory)
    );

    let configuration_file_path = write_configuration(&directory, &contents);
    let report = Configuration::load_from_path(&configuration_file_path).unwrap_err();

    assert!(find_validation_error(&report).is_none());
}

#[test]
fn missing_base_data_directory_is_not_created() {
    let directory = TempDir::new().unwrap();
    let data_directory = directory.path().join("missing");

    let contents = format!(
        "[base_paths]\nbase_data_directory_path = {:?}\n",
        data_directory.to_string_lossy()
    );

    let configuration_file_path = write_configuration(&directory, &contents);
    let report = Configuration::load_from_path(&configuration_file_path).unwrap_err();

    assert!(find_validation_error(&report).is_none());
    assert!(!data_directory.exists());
}

#[test]
fn base_data_directory_must_be_a_directory() {
    let directory = TempDir::new().unwrap();
    let data_file_path = directory.path().join("data.txt");
    fs::write(&data_file_path, "not a directory").unwrap();

    let contents = format!(
        "[base_paths]\nbase_data_directory_path = {:?}\n",
        data_file_path.to_string_lossy()
    );

    let configuration_file_path = write_configuration(&directory, &contents);

    assert!(Configuration::load_from_path(&configuration_file_path).is_err());
}

#[test]
fn missing_file_is_reported() {
    let directory = TempDir::new().unwrap();
    let configuration_file_path = directory.path().join("does-not-exist.toml");

    assert!(Configuration::load_from_path(configuration_file_path).is_err());
}
