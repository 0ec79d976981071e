//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use cleanstation::core::Catalog;
use cleanstation::schema::parse_order_configuration;
use cleanstation::entities::OrderConfiguration;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Catalog covering every id the standard scenarios select
pub const CATALOG_YAML: &str = r#"
assemblies:
  - id: T2-STD-MANUAL-EN-KIT
    name: STANDARD MANUAL KIT EN
    type: KIT
    components:
      - id: MAN-EN
  - id: T2-STD-MANUAL-FR-KIT
    name: STANDARD MANUAL KIT FR
    type: KIT
    components:
      - id: MAN-FR
  - id: T2-BODY-48-60-HA
    name: SINK BODY 48-60 HEIGHT ADJUSTABLE
    type: COMPLEX
    components:
      - id: T2-BODY-FRAME-48-60
        quantity: 1
      - id: SCREW-10-32
        quantity: 12
  - id: T2-BODY-FRAME-48-60
    name: BODY FRAME 48-60
    type: SUB_ASSEMBLY
    components:
      - id: BRACKET-711
        quantity: 4
  - id: T2-DL27-KIT
    name: DL27 LEG KIT
    type: KIT
    components:
      - id: LEG-DL27
        quantity: 4
  - id: T2-LEVELING-CASTOR-475
    name: LEVELING CASTOR KIT
    type: KIT
    components:
      - id: CASTOR-475
        quantity: 4
  - id: T2-BSN-ESK-KIT
    name: E-SINK BASIN KIT
    type: KIT
    components:
      - id: DRAIN-ESK
  - id: T2-BSN-EDR-KIT
    name: E-DRAIN BASIN KIT
    type: KIT
    components:
      - id: DRAIN-EDR
  - id: T2-ADW-BASIN24X20X8
    name: BASIN 24X20X8
    type: SIMPLE
  - id: T2-CTRL-ESK1
    name: CONTROL BOX 1 E-SINK
    type: KIT
  - id: T2-CTRL-ESK3
    name: CONTROL BOX 3 E-SINK
    type: KIT
  - id: T2-CTRL-EDR2
    name: CONTROL BOX 2 E-DRAIN
    type: KIT
  - id: T2-CTRL-EDR1-ESK2
    name: CONTROL BOX 1 E-DRAIN 2 E-SINK
    type: KIT
  - id: T2-OA-STD-FAUCET-WB-KIT
    name: STANDARD WRIST BLADE FAUCET KIT
    type: KIT
    components:
      - id: FAUCET-WB
  - id: ACC-1
    name: BINDER SHELF
    type: KIT
    components:
      - id: SHELF-PANEL
        quantity: 2
parts:
  - id: MAN-EN
    part_number: "950.001-EN"
    name: MANUAL EN
  - id: MAN-FR
    part_number: "950.001-FR"
    name: MANUAL FR
  - id: SCREW-10-32
    part_number: "300.010"
    name: SCREW 10-32
  - id: BRACKET-711
    part_number: "711.01"
    name: BODY BRACKET
  - id: LEG-DL27
    part_number: "711.97"
    name: DL27 LEG
  - id: CASTOR-475
    part_number: "475.01"
    name: LEVELING CASTOR
  - id: DRAIN-ESK
    part_number: "720.100"
    name: E-SINK DRAIN
  - id: DRAIN-EDR
    part_number: "720.200"
    name: E-DRAIN DRAIN
  - id: FAUCET-WB
    part_number: "706.58"
    name: WRIST BLADE FAUCET
  - id: SHELF-PANEL
    part_number: "810.20"
    name: SHELF PANEL
"#;

/// Helper to get a cleanstation command
pub fn cleanstation() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("cleanstation"));
    cmd.env_remove("CLEANSTATION_CATALOG")
        .env_remove("CLEANSTATION_DB")
        .env_remove("CLEANSTATION_LOG");
    cmd
}

pub fn catalog() -> Catalog {
    Catalog::from_yaml_str(CATALOG_YAML).unwrap()
}

/// Temp workspace with `catalog/kits.yaml` written
pub fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_catalog(tmp.path());
    tmp
}

pub fn write_catalog(root: &Path) -> PathBuf {
    let dir = root.join("catalog");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("kits.yaml"), CATALOG_YAML).unwrap();
    dir
}

/// Single build: 55" sink, DL27 legs, casters, one E-Sink basin, one faucet
pub fn standard_build() -> Value {
    json!({
        "sinkModelId": "T2-B1",
        "width": 30,
        "length": 55,
        "legsType": "DL27",
        "feetType": "CASTERS",
        "basins": [{ "basinType": "E_SINK", "basinSize": "24X20X8", "addons": [] }],
        "faucets": [{ "faucetType": "STD_WRIST_BLADE", "quantity": 1 }]
    })
}

/// Order payload with the given builds keyed by build number
pub fn order_payload(builds: &[(&str, Value)]) -> Value {
    let mut configurations = serde_json::Map::new();
    for (b, cfg) in builds {
        configurations.insert(b.to_string(), cfg.clone());
    }
    json!({
        "customer": {
            "poNumber": "PO-1001",
            "customerName": "Acme Hospital",
            "language": "EN"
        },
        "buildNumbers": builds.iter().map(|(b, _)| *b).collect::<Vec<_>>(),
        "configurations": configurations,
        "accessories": {}
    })
}

pub fn parse_order(payload: &Value) -> OrderConfiguration {
    parse_order_configuration(&payload.to_string()).unwrap()
}

/// Write `payload` to `order.json` under `root`
pub fn write_order(root: &Path, payload: &Value) -> PathBuf {
    let path = root.join("order.json");
    fs::write(&path, serde_json::to_string_pretty(payload).unwrap()).unwrap();
    path
}

/// Create an order through the CLI and return its id
pub fn create_order(tmp: &TempDir, id: &str, created_by: &str) -> String {
    cleanstation()
        .current_dir(tmp.path())
        .args([
            "order",
            "new",
            "--id",
            id,
            "--po",
            "PO-1001",
            "--customer",
            "Acme Hospital",
            "--created-by",
            created_by,
        ])
        .assert()
        .success();
    id.to_string()
}
