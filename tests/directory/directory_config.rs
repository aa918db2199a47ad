use dicom_mcp::directory::{DirectoryError, DirectoryService, LocalAeResolution, NodeStore};
use std::path::Path;

fn service_for(dir: &Path, yaml: Option<&str>) -> DirectoryService {
    let path = dir.join("nodes.yaml");
    if let Some(yaml) = yaml {
        std::fs::write(&path, yaml).expect("write nodes file");
    }
    DirectoryService::new(NodeStore::new(path), "MCP_DICOM")
}

const NODES: &str = r#"
nodes:
  orthanc:
    ae_title: ORTHANC
    ip: 127.0.0.1
    port: 4242
    description: Local Orthanc
  pacs:
    ae_title: MAIN_PACS
    ip: pacs.hospital.local
    port: 104
  archive:
    ae_title: ARCHIVE
    ip: 10.0.0.20
    port: "11112"
local_ae_titles:
  - name: default
    ae_title: MCP_SCU
    description: Default calling AE
  - name: research
    ae_title: RESEARCH
"#;

#[test]
fn listing_preserves_file_order_and_fills_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_for(dir.path(), Some(NODES));

    let listing = service.list_nodes();
    let names: Vec<_> = listing.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["orthanc", "pacs", "archive"]);

    assert_eq!(listing.nodes[1].description, "");
    assert_eq!(listing.nodes[2].port, 11112);
    assert_eq!(listing.local_ae_titles.len(), 2);
    assert_eq!(listing.local_ae_titles[1].description, "");

    let json = serde_json::to_value(&listing).unwrap();
    assert_eq!(json["nodes"][0]["ip"], "127.0.0.1");
    assert_eq!(json["nodes"][0]["ae_title"], "ORTHANC");
}

#[test]
fn missing_sections_are_empty() {
    let dir = tempfile::tempdir().unwrap();

    let service = service_for(dir.path(), Some("nodes:\n  a:\n    ae_title: A\n    ip: h\n    port: 1\n"));
    let listing = service.list_nodes();
    assert_eq!(listing.nodes.len(), 1);
    assert!(listing.local_ae_titles.is_empty());

    let service = service_for(dir.path(), Some("local_ae_titles:\n  - name: x\n    ae_title: X\n"));
    let listing = service.list_nodes();
    assert!(listing.nodes.is_empty());
    assert_eq!(listing.local_ae_titles.len(), 1);
}

#[test]
fn absent_or_malformed_file_yields_empty_directory() {
    let dir = tempfile::tempdir().unwrap();

    let service = service_for(dir.path(), None);
    assert!(service.list_nodes().nodes.is_empty());

    let service = service_for(dir.path(), Some("nodes: [unterminated"));
    let listing = service.list_nodes();
    assert!(listing.nodes.is_empty());
    assert!(listing.local_ae_titles.is_empty());
}

#[test]
fn peer_resolution_is_total() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_for(dir.path(), Some(NODES));

    let pacs = service.resolve_peer("pacs").unwrap();
    assert_eq!(pacs.ae_title, "MAIN_PACS");
    assert_eq!(pacs.host, "pacs.hospital.local");
    assert_eq!(pacs.port, 104);

    let err = service.resolve_peer("nonexistent").unwrap_err();
    assert_eq!(err, DirectoryError::PeerNotFound("nonexistent".to_string()));
    assert_eq!(err.to_string(), "Node 'nonexistent' not found in configuration");
}

#[test]
fn local_identity_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_for(dir.path(), Some(NODES));

    assert_eq!(service.resolve_local_identity("research").ae_title(), "RESEARCH");
    assert_eq!(service.resolve_local_identity("default").ae_title(), "MCP_SCU");
    assert_eq!(
        service.resolve_local_identity("clinical"),
        LocalAeResolution::Fallback("MCP_DICOM".to_string())
    );
}

#[test]
fn edits_are_picked_up_without_restart() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_for(dir.path(), Some(NODES));
    assert!(service.resolve_peer("newcomer").is_err());

    let updated = format!("{}\n", NODES.replace(
        "local_ae_titles:",
        "  newcomer:\n    ae_title: NEW\n    ip: 10.9.9.9\n    port: 2000\nlocal_ae_titles:",
    ));
    std::fs::write(dir.path().join("nodes.yaml"), updated).unwrap();

    assert_eq!(service.resolve_peer("newcomer").unwrap().ae_title, "NEW");
}
