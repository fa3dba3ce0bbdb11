use crate::pipeline::*;

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;

pub const DEFAULT_OUTPUT_PATH: &str = "combined_bike_data.csv";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    /// A file path, or `stdout`.
    #[serde(rename = "summaryPath")]
    pub summary_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// `csv`, `xlsx` or `xls`. Inferred from the file extension when absent.
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub role: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub delimiter: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Xlsx,
    Xls,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SourceRole {
    Recent,
    Historical,
}

impl Display for SourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceRole::Recent => write!(f, "recent"),
            SourceRole::Historical => write!(f, "historical"),
        }
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

impl FileSource {
    pub fn provider(&self) -> BikeResult<Provider> {
        let p = match &self.provider {
            Some(p) => p.to_lowercase(),
            None => extension(&self.file_path).unwrap_or_default(),
        };
        match p.as_str() {
            "csv" | "tsv" | "txt" => Ok(Provider::Csv),
            "xlsx" | "xlsm" => Ok(Provider::Xlsx),
            "xls" => Ok(Provider::Xls),
            _ => UnknownProviderSnafu {
                provider: p.clone(),
                path: self.file_path.clone(),
            }
            .fail(),
        }
    }

    pub fn role(&self) -> BikeResult<SourceRole> {
        match self.role.to_lowercase().as_str() {
            "recent" => Ok(SourceRole::Recent),
            "historical" => Ok(SourceRole::Historical),
            _ => UnknownRoleSnafu {
                role: self.role.clone(),
            }
            .fail(),
        }
    }

    pub fn delimiter_byte(&self) -> BikeResult<u8> {
        match &self.delimiter {
            Some(d) if d == "\\t" || d == "\t" => Ok(b'\t'),
            Some(d) if d.len() == 1 && d.is_ascii() => Ok(d.as_bytes()[0]),
            Some(d) => InvalidDelimiterSnafu {
                delimiter: d.clone(),
            }
            .fail(),
            None if extension(&self.file_path).as_deref() == Some("tsv") => Ok(b'\t'),
            None => Ok(b','),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeSettings {
    /// `byShape` (default), `drop` or `keep`.
    #[serde(rename = "zeroCounts")]
    pub zero_counts: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub sources: Vec<FileSource>,
    pub options: Option<NormalizeSettings>,
}

impl PipelineConfig {
    pub fn normalize_options(&self) -> BikeResult<NormalizeOptions> {
        let zero_counts = match self.options.as_ref().and_then(|o| o.zero_counts.as_deref()) {
            None | Some("byShape") => ZeroCountPolicy::ByShape,
            Some("drop") => ZeroCountPolicy::Drop,
            Some("keep") => ZeroCountPolicy::Keep,
            Some(x) => {
                return UnknownZeroCountsSnafu {
                    value: x.to_string(),
                }
                .fail()
            }
        };
        Ok(NormalizeOptions { zero_counts })
    }

    pub fn output_path(&self, root: Option<&Path>) -> String {
        let p = self
            .output_settings
            .output_path
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_PATH);
        resolve_path(root, p)
    }

    pub fn summary_path(&self, root: Option<&Path>) -> Option<String> {
        match self.output_settings.summary_path.as_deref() {
            Some("stdout") => Some("stdout".to_string()),
            Some(p) => Some(resolve_path(root, p)),
            None => None,
        }
    }
}

/// Relative paths are taken relative to the directory of the configuration
/// file.
pub fn resolve_path(root: Option<&Path>, path: &str) -> String {
    match root {
        Some(r) if Path::new(path).is_relative() => r.join(path).display().to_string(),
        _ => path.to_string(),
    }
}

pub fn read_config(path: &str) -> BBikeResult<PipelineConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: PipelineConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", config);
    Ok(config)
}

/// Reads a reference CSV file, with its line endings normalized.
pub fn read_reference(path: &str) -> BikeResult<String> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    Ok(contents.replace("\r\n", "\n"))
}
