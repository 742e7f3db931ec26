//! Job file support for deduplication runs

use anyhow::{bail, Context, Result};
use rowdedup_core::{ArrayLayout, UniqueOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A complete deduplication job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Axis and parallelism; which outputs to return follows `output`
    #[serde(default)]
    pub options: UniqueOptions,
}

impl JobConfig {
    /// Load a job from a file (YAML or TOML)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML job: {}", path.display())),
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML job: {}", path.display())),
            _ => Err(anyhow::anyhow!(
                "Unsupported job file format: {}. Use .yaml, .yml, or .toml",
                extension
            )),
        }
    }

    /// Save the job to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let content = match extension {
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            "toml" => toml::to_string_pretty(self)?,
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported job file format: {}. Use .yaml, .yml, or .toml",
                    extension
                ))
            }
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write job file: {}", path.display()))?;

        Ok(())
    }

    /// Options for the core, with outputs requested exactly where a path is set
    pub fn unique_options(&self) -> UniqueOptions {
        UniqueOptions {
            return_index: self.output.index.is_some(),
            return_inverse: self.output.inverse.is_some(),
            return_counts: self.output.counts.is_some(),
            ..self.options.clone()
        }
    }
}

/// Input file and how its bytes are laid out
///
/// Either `stride` (flat records) or `shape` (an N-dimensional array of
/// `item_size`-byte items) must be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stride: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_size: Option<usize>,
}

impl InputConfig {
    /// Resolve the array layout for an input of `len` bytes
    pub fn layout(&self, len: usize) -> Result<ArrayLayout> {
        match (&self.shape, self.stride) {
            (Some(_), Some(_)) => bail!("Specify either a stride or a shape, not both"),
            (Some(shape), None) => {
                let layout = ArrayLayout::new(shape.clone(), self.item_size.unwrap_or(1))?;
                let expected = layout.byte_len()?;
                if expected != len {
                    bail!(
                        "Shape {:?} of {}-byte items needs {} bytes but {} has {}",
                        layout.shape,
                        layout.item_size,
                        expected,
                        self.path,
                        len
                    );
                }
                Ok(layout)
            }
            (None, Some(stride)) => {
                if stride == 0 {
                    bail!("Stride must be non-zero");
                }
                if len % stride != 0 {
                    bail!(
                        "{} has {} bytes, not a whole number of {}-byte records",
                        self.path,
                        len,
                        stride
                    );
                }
                Ok(ArrayLayout::records(len / stride, stride))
            }
            (None, None) => bail!("Specify a record stride or an array shape"),
        }
    }
}

/// Output files; any omitted output is not computed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Unique records, as raw bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    /// First-occurrence positions, little-endian u64
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Group rank per input record, little-endian u64
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse: Option<String>,
    /// Population per group, little-endian u64
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<String>,
}
