//! YAML parsing helpers shared by the catalog loader and configuration

pub mod parser;

pub use parser::{parse_yaml, parse_yaml_file, YamlError};
