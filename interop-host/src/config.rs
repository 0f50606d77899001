//! Demo configuration loading and parsing
//!
//! Every field is optional; an empty file (or no file at all) reproduces
//! the fixed demonstration sequence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs for one run of the demo (loaded from a TOML or JSON file)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DemoConfig {
    /// Shared library to load instead of the statically linked one
    #[serde(default)]
    pub library: Option<PathBuf>,
    #[serde(default)]
    pub add: AddConfig,
    #[serde(default)]
    pub string: StringConfig,
    #[serde(default)]
    pub fibonacci: FibonacciConfig,
    #[serde(default)]
    pub buffers: BufferConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AddConfig {
    #[serde(default = "default_add_a")]
    pub a: i32,
    #[serde(default = "default_add_b")]
    pub b: i32,
}

impl Default for AddConfig {
    fn default() -> Self {
        Self {
            a: default_add_a(),
            b: default_add_b(),
        }
    }
}

fn default_add_a() -> i32 {
    5
}

fn default_add_b() -> i32 {
    7
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StringConfig {
    #[serde(default = "default_input")]
    pub input: String,
}

impl Default for StringConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
        }
    }
}

fn default_input() -> String {
    "hello from rust host".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FibonacciConfig {
    #[serde(default = "default_fibonacci_n")]
    pub n: u32,
}

impl Default for FibonacciConfig {
    fn default() -> Self {
        Self {
            n: default_fibonacci_n(),
        }
    }
}

fn default_fibonacci_n() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BufferConfig {
    /// Values doubled by the native side
    #[serde(default = "default_process")]
    pub process: Vec<i32>,
    /// Values summed by the native side
    #[serde(default = "default_sum")]
    pub sum: Vec<i32>,
    /// Values summed from a growable list
    #[serde(default = "default_list")]
    pub list: Vec<i32>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            process: default_process(),
            sum: default_sum(),
            list: default_list(),
        }
    }
}

fn default_process() -> Vec<i32> {
    vec![1, 2, 3, 4, 5]
}

fn default_sum() -> Vec<i32> {
    vec![10, 20, 30, 40]
}

fn default_list() -> Vec<i32> {
    vec![2, 4, 6, 8, 10]
}

impl DemoConfig {
    /// Builder method: load the native library from `path`
    pub fn with_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.library = Some(path.into());
        self
    }
}

/// Builders for test fixtures; real runs take their values from a file
#[cfg(test)]
impl DemoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_add(mut self, a: i32, b: i32) -> Self {
        self.add = AddConfig { a, b };
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.string.input = input.into();
        self
    }

    pub fn with_fibonacci(mut self, n: u32) -> Self {
        self.fibonacci.n = n;
        self
    }

    pub fn with_buffers(mut self, process: Vec<i32>, sum: Vec<i32>, list: Vec<i32>) -> Self {
        self.buffers = BufferConfig { process, sum, list };
        self
    }
}

/// Load configuration from a TOML file, or JSON when the extension is `.json`
pub fn load_config(path: &Path) -> Result<DemoConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config: DemoConfig = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_matches_fixed_demo() {
        let config: DemoConfig = toml::from_str("").unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.add, AddConfig { a: 5, b: 7 });
        assert_eq!(config.fibonacci.n, 10);
        assert_eq!(config.buffers.process, vec![1, 2, 3, 4, 5]);
        assert_eq!(config.buffers.sum, vec![10, 20, 30, 40]);
        assert!(config.library.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            library = "dist/libinterop_native.so"

            [add]
            a = 40

            [string]
            input = "custom"

            [buffers]
            sum = [1, 2, 3]
        "#;

        let config: DemoConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.library, Some(PathBuf::from("dist/libinterop_native.so")));
        assert_eq!(config.add, AddConfig { a: 40, b: 7 });
        assert_eq!(config.string.input, "custom");
        assert_eq!(config.buffers.sum, vec![1, 2, 3]);
        assert_eq!(config.buffers.process, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_load_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"fibonacci": {{"n": 20}}}}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.fibonacci.n, 20);
        assert_eq!(config.add, AddConfig::default());
    }

    #[test]
    fn test_load_toml_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[fibonacci]\nn = 3").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config, DemoConfig::new().with_fibonacci(3));
    }

    #[test]
    fn test_with_library_keeps_demo_values() {
        let config = DemoConfig::default().with_library("dist/libinterop_native.so");
        assert_eq!(config.library, Some(PathBuf::from("dist/libinterop_native.so")));
        assert_eq!(
            DemoConfig {
                library: None,
                ..config
            },
            DemoConfig::default()
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[add]\na = \"five\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
