use dicom_mcp::config::{Config, ConfigError};

fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml).expect("TOML parse error");
    config.validate()?;
    Ok(config)
}

#[test]
fn test_basic_config() {
    let toml = r#"
        [server]
        id = "dicom-mcp-radiology"
        bind_address = "127.0.0.1"
        bind_port = 8811

        [directory]
        nodes_file = "/etc/dicom-mcp/nodes.yaml"
        default_local_ae_title = "RADIOLOGY_SCU"

        [dimse]
        connect_timeout_ms = 3000
        read_timeout_ms = 10000
        max_pdu = 32768
    "#;

    let config = load_config_from_str(toml).expect("valid config");
    assert_eq!(config.server.socket_addr().unwrap().to_string(), "127.0.0.1:8811");
    assert_eq!(
        config.nodes_path(),
        std::path::PathBuf::from("/etc/dicom-mcp/nodes.yaml")
    );
    assert_eq!(config.dimse.max_pdu, 32768);
}

#[test]
fn test_empty_server_id_rejected() {
    let result = load_config_from_str("[server]\nid = \"  \"\n");
    assert!(matches!(result, Err(ConfigError::InvalidServerId)));
}

#[test]
fn test_invalid_bind_address_rejected() {
    let result = load_config_from_str("[server]\nbind_address = \"not an address\"\n");
    assert!(matches!(result, Err(ConfigError::InvalidBindAddress(_))));
}

#[test]
fn test_zero_port_rejected() {
    let result = load_config_from_str("[server]\nbind_port = 0\n");
    assert!(matches!(result, Err(ConfigError::InvalidPort)));
}

#[test]
fn test_invalid_default_ae_title_rejected() {
    for ae in ["", "AE_TITLE_LONGER_THAN_16", "BAD\\AE"] {
        let toml = format!("[directory]\ndefault_local_ae_title = {:?}\n", ae);
        let result = load_config_from_str(&toml);
        assert!(
            matches!(result, Err(ConfigError::InvalidAeTitle(_))),
            "AE title {:?} should be rejected",
            ae
        );
    }
}

#[test]
fn test_zero_timeouts_rejected() {
    let result = load_config_from_str("[dimse]\nconnect_timeout_ms = 0\n");
    assert!(matches!(result, Err(ConfigError::InvalidTimeout)));

    let result = load_config_from_str("[dimse]\nread_timeout_ms = 0\n");
    assert!(matches!(result, Err(ConfigError::InvalidTimeout)));
}

#[test]
fn test_out_of_range_pdu_rejected() {
    let result = load_config_from_str("[dimse]\nmax_pdu = 1024\n");
    assert!(matches!(result, Err(ConfigError::InvalidDimse(_))));
}

#[test]
fn test_unknown_transport_fails_to_parse() {
    let result: Result<Config, _> = toml::from_str("[server]\ntransport = \"grpc\"\n");
    assert!(result.is_err());
}

#[test]
fn test_sample_config_and_nodes_file() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/dicom-mcp.toml");
    let config = Config::load(&path).expect("sample config parses");
    config.validate().expect("sample config is valid");
    assert!(config.nodes_path().ends_with("config/nodes.yaml"));

    let directory = dicom_mcp::directory::DirectoryService::new(
        dicom_mcp::directory::NodeStore::new(config.nodes_path()),
        config.directory.default_local_ae_title.clone(),
    );
    let listing = directory.list_nodes();
    assert_eq!(listing.nodes.len(), 2);
    assert_eq!(listing.local_ae_titles[0].name, "default");
}
