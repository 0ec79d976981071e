//! YAML parsing with error handling

use miette::Diagnostic;
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

/// YAML read/parse failure, carrying the source name for diagnostics
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error("Failed to parse {filename}: {message}")]
    #[diagnostic(code(cleanstation::yaml::syntax))]
    Syntax {
        filename: String,
        message: String,
        line: Option<usize>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse YAML content into a typed value
pub fn parse_yaml<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| {
        let message = e.to_string();
        match e.location() {
            Some(loc) => YamlError::Syntax {
                filename: filename.to_string(),
                line: Some(loc.line()),
                message: if message.contains("line") {
                    message
                } else {
                    format!("{} (line {})", message, loc.line())
                },
            },
            None => {
                let line =
                    backticked_key(&message).and_then(|key| unquoted_number_line(content, key));
                YamlError::Syntax {
                    filename: filename.to_string(),
                    message: match line {
                        Some(n) => format!("{} (line {})", message, n),
                        None => message,
                    },
                    line,
                }
            }
        }
    })
}

/// First `` `key` `` named in a deserializer message
fn backticked_key(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(&message[start..start + len])
}

/// 1-based line of the first `key: <number>` mapping entry
///
/// Type errors raised from inside a field deserializer carry no position.
fn unquoted_number_line(content: &str, key: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| {
            let entry = line.trim_start().trim_start_matches("- ");
            match entry.split_once(':') {
                Some((k, v)) => k.trim() == key && v.trim().parse::<f64>().is_ok(),
                None => false,
            }
        })
        .map(|i| i + 1)
}

/// Parse YAML from a file path
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    parse_yaml(&content, &filename)
}
