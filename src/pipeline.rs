use log::{debug, info, warn};

use count_normalizer::classify::classify_table;
use count_normalizer::shape::detect_shape;
use count_normalizer::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::pipeline::config_reader::*;
use crate::pipeline::io_common::simplify_file_name;
use crate::pipeline::io_output::{dataset_to_csv_string, summary_json};

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod io_output;

#[derive(Debug, Snafu)]
pub enum BikeError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningXls {
        source: calamine::XlsError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} has no worksheet named {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("The file {path} has no header row"))]
    CsvEmpty { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing json"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing csv record"))]
    WritingCsv { source: csv::Error },
    #[snafu(display("Unknown provider {provider:?} for {path}"))]
    UnknownProvider { provider: String, path: String },
    #[snafu(display("Unknown source role {role:?}, expected 'recent' or 'historical'"))]
    UnknownRole { role: String },
    #[snafu(display("Invalid delimiter {delimiter:?}, a single character is expected"))]
    InvalidDelimiter { delimiter: String },
    #[snafu(display("Unknown zeroCounts option {value:?}"))]
    UnknownZeroCounts { value: String },
    #[snafu(display("No source was provided (use --config, --recent or --historical)"))]
    NoSources {},
    #[snafu(display("Could not normalize {path}"))]
    Normalizing {
        source: NormalizeErrors,
        path: String,
    },
    #[snafu(display("Could not combine the sources"))]
    Merging { source: NormalizeErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type BikeResult<T> = Result<T, BikeError>;
pub type BBikeResult<T> = Result<T, Box<BikeError>>;

/// What happened to one source during a run.
#[derive(Debug)]
struct SourceReport {
    path: String,
    role: SourceRole,
    outcome: Result<Normalized, String>,
}

fn read_raw_table(path: &str, cfs: &FileSource) -> BBikeResult<RawTable> {
    let provider = cfs.provider()?;
    info!("Attempting to read {:?} file {:?}", provider, path);
    match provider {
        Provider::Csv => io_csv::read_csv_file(path, cfs),
        Provider::Xlsx | Provider::Xls => io_excel::read_excel_file(path, cfs, provider),
    }
}

fn process_source(path: &str, cfs: &FileSource, options: &NormalizeOptions) -> BBikeResult<Normalized> {
    let table = read_raw_table(path, cfs)?;
    let res = normalize_table(&table, options).context(NormalizingSnafu { path })?;
    Ok(res)
}

fn shape_label(shape: &ShapeDecision) -> &'static str {
    match shape {
        ShapeDecision::Wide { .. } => "wide",
        ShapeDecision::Long { .. } => "long",
    }
}

fn report_json(report: &SourceReport) -> JSValue {
    let base = json!({
        "filePath": simplify_file_name(&report.path),
        "role": report.role.to_string(),
    });
    match &report.outcome {
        Ok(n) => {
            let mut js = base;
            js["shape"] = json!(shape_label(&n.shape));
            js["loosened"] = json!(n.loosened);
            js["observations"] = json!(n.dataset.len());
            js["drops"] = json!({
                "rowsSeen": n.drops.rows_seen,
                "unresolvedDate": n.drops.unresolved_date,
                "invalidCount": n.drops.invalid_count,
                "missingCount": n.drops.missing_count,
                "zeroCount": n.drops.zero_count,
                "missingLocation": n.drops.missing_location,
            });
            js
        }
        Err(msg) => {
            let mut js = base;
            js["error"] = json!(msg);
            js
        }
    }
}

/// Reads every source, normalizes it and combines the results.
///
/// A source that cannot be read or whose layout is not recognized is
/// reported and skipped: the run continues with the remaining sources. The
/// run fails only when nothing at all could be extracted.
pub fn run_pipeline(
    config: &PipelineConfig,
    root: Option<&Path>,
    reference_path: Option<String>,
) -> BBikeResult<()> {
    if config.sources.is_empty() {
        return Err(Box::new(BikeError::NoSources {}));
    }
    let options = config.normalize_options()?;

    let mut reports: Vec<SourceReport> = Vec::new();
    for cfs in config.sources.iter() {
        let path = resolve_path(root, &cfs.file_path);
        let role = cfs.role()?;
        let outcome = match process_source(&path, cfs, &options) {
            Ok(n) => {
                info!(
                    "{}: {} observations ({} source)",
                    simplify_file_name(&path),
                    n.dataset.len(),
                    role
                );
                Ok(n)
            }
            Err(e) => {
                warn!("Skipping {} source {}: {}", role, path, error_chain(&e));
                Err(error_chain(&e))
            }
        };
        reports.push(SourceReport {
            path,
            role,
            outcome,
        });
    }

    let mut recent: Option<Dataset> = None;
    let mut historical: Option<Dataset> = None;
    for report in reports.iter() {
        if let Ok(n) = &report.outcome {
            let slot = match report.role {
                SourceRole::Recent => &mut recent,
                SourceRole::Historical => &mut historical,
            };
            slot.get_or_insert_with(Dataset::default)
                .append(n.dataset.clone());
        }
    }

    let merged = merge_datasets(historical, recent).context(MergingSnafu {})?;
    let csv_text = dataset_to_csv_string(&merged.dataset)?;

    let out_path = config.output_path(root);
    fs::write(&out_path, csv_text.as_bytes()).context(WritingOutputSnafu {
        path: out_path.clone(),
    })?;
    info!(
        "Saved {} records to {}",
        merged.dataset.len(),
        out_path
    );

    let sources_js: Vec<JSValue> = reports.iter().map(report_json).collect();
    let summary_js = summary_json(&out_path, &merged, sources_js);
    let pretty_js = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    match config.summary_path(root) {
        Some(p) if p == "stdout" => println!("{}", pretty_js),
        Some(p) => {
            fs::write(&p, pretty_js.as_bytes()).context(WritingOutputSnafu { path: p.clone() })?;
            info!("Summary written to {}", p);
        }
        None => {}
    }

    if let Some(ref_p) = reference_path {
        check_reference(&ref_p, &csv_text)?;
    }
    Ok(())
}

fn check_reference(path: &str, produced: &str) -> BikeResult<()> {
    let reference = read_reference(path)?;
    info!("Comparing output with reference {}", path);
    let produced = produced.replace("\r\n", "\n");
    if reference.trim_end() != produced.trim_end() {
        warn!("Found differences with the reference file");
        print_diff(reference.trim_end(), produced.trim_end(), "\n");
        whatever!("Difference detected between the combined data and the reference file {}", path)
    }
    Ok(())
}

/// Prints how each source would be read, without writing anything.
pub fn run_inspect(config: &PipelineConfig, root: Option<&Path>) -> BBikeResult<()> {
    if config.sources.is_empty() {
        return Err(Box::new(BikeError::NoSources {}));
    }
    for cfs in config.sources.iter() {
        let path = resolve_path(root, &cfs.file_path);
        let table = match read_raw_table(&path, cfs) {
            Ok(t) => t,
            Err(e) => {
                warn!("Cannot read {}: {}", path, error_chain(&e));
                continue;
            }
        };
        println!(
            "{} ({}): {} rows x {} columns",
            simplify_file_name(&path),
            cfs.role()?,
            table.num_rows(),
            table.num_columns()
        );
        let roles = classify_table(&table);
        for rm in roles.iter() {
            println!(
                "  {:>3} {:<40} {:<8} {:?}",
                rm.column,
                rm.name,
                format!("{:?}", rm.dtype),
                rm.role
            );
        }
        match detect_shape(&roles) {
            Ok(shape) => println!("  shape: {} {:?}", shape_label(&shape), shape),
            Err(e) => println!("  shape: {}", e),
        }
        debug!("inspect: {:?}", roles);
    }
    Ok(())
}

fn error_chain(e: &BikeError) -> String {
    let mut msg = e.to_string();
    let mut cur: Option<&dyn std::error::Error> = std::error::Error::source(e);
    while let Some(s) = cur {
        msg = format!("{}: {}", msg, s);
        cur = s.source();
    }
    msg
}

/// Builds the configuration of a run from the command line, reading the
/// JSON configuration if one is given. Paths given on the command line
/// take precedence over the configuration file.
pub fn config_from_args(args: &Args) -> BBikeResult<(PipelineConfig, Option<String>)> {
    let (mut config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.display().to_string());
            (config, root)
        }
        None => (PipelineConfig::default(), None),
    };

    for (arg, role) in [
        (&args.recent, SourceRole::Recent),
        (&args.historical, SourceRole::Historical),
    ] {
        if let Some(p) = arg {
            config.sources.retain(|s| s.role().ok() != Some(role));
            // Command-line paths are relative to the working directory.
            let abs = std::env::current_dir()
                .map(|d| d.join(p).display().to_string())
                .unwrap_or_else(|_| p.clone());
            config.sources.push(FileSource {
                provider: args.input_type.clone(),
                file_path: abs,
                role: role.to_string(),
                excel_worksheet_name: args.excel_worksheet_name.clone(),
                delimiter: None,
            });
        }
    }

    if let Some(out) = &args.out {
        config.output_settings.output_path = Some(out.clone());
    }
    if let Some(summary) = &args.summary {
        config.output_settings.summary_path = Some(summary.clone());
    }
    debug!("config_from_args: {:?}", config);
    Ok((config, root))
}

pub fn run(args: &Args) -> BBikeResult<()> {
    let (config, root) = config_from_args(args)?;
    let root_p = root.as_deref().map(Path::new);
    if args.inspect {
        run_inspect(&config, root_p)
    } else {
        run_pipeline(&config, root_p, args.reference.clone())
    }
}
