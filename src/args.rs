use clap::Parser;

/// Combines bicycle count tables of different layouts into one dataset.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the sources and the outputs.
    /// Relative paths in this file are resolved against its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The recent source, typically the long export of a counting system.
    /// Overrides the recent sources of the --config file.
    #[clap(long, value_parser)]
    pub recent: Option<String>,

    /// (file path) The historical source, typically a wide table with one column per location.
    /// Overrides the historical sources of the --config file.
    #[clap(long, value_parser)]
    pub historical: Option<String>,

    /// (csv, xlsx or xls) The type of the files passed with --recent and --historical.
    /// By default, it is inferred from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using a spreadsheet, the name of the worksheet to use. By default, the first
    /// worksheet with more than 5 columns.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, default combined_bike_data.csv) Where the combined dataset is written.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or 'stdout') If specified, a summary of the run is written in JSON format
    /// to the given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference CSV file. If provided, the combined dataset is checked against it
    /// and the differences are printed.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// Prints the columns of each source with their detected roles and the detected layout,
    /// without writing anything.
    #[clap(long, takes_value = false)]
    pub inspect: bool,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
