// Writing the combined dataset and the run summary.

use std::io::Write;

use serde_json::json;
use serde_json::Value as JSValue;

use crate::pipeline::*;

pub const OUTPUT_HEADER: [&str; 5] = ["Date", "Year", "Month", "Route", "Count"];

pub fn write_dataset<W: Write>(out: W, dataset: &Dataset) -> BikeResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(OUTPUT_HEADER).context(WritingCsvSnafu {})?;
    for obs in dataset.observations.iter() {
        wtr.write_record(&[
            obs.date.format("%Y-%m-%d").to_string(),
            obs.year.to_string(),
            obs.month.clone(),
            obs.route.clone(),
            format_number(obs.count),
        ])
        .context(WritingCsvSnafu {})?;
    }
    wtr.flush().context(WritingOutputSnafu { path: "<csv>" })?;
    Ok(())
}

pub fn dataset_to_csv_string(dataset: &Dataset) -> BikeResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_dataset(&mut buf, dataset)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn summary_json(output_path: &str, merged: &MergeOutcome, sources: Vec<JSValue>) -> JSValue {
    let summary = merged.dataset.summary();
    let fmt_date = |d: Option<chrono::NaiveDate>| d.map(|x| x.format("%Y-%m-%d").to_string());
    json!({
        "output": output_path,
        "summary": {
            "records": summary.records,
            "dateRange": {
                "start": fmt_date(summary.first_date),
                "end": fmt_date(summary.last_date),
            },
            "routes": summary.routes,
            "totalCount": summary.total_count,
        },
        "merge": {
            "historicalRows": merged.historical_rows,
            "recentRows": merged.recent_rows,
            "duplicatesRemoved": merged.duplicates_removed,
        },
        "sources": sources,
    })
}
