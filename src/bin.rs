/*
MIT License
Copyright (c) 2021 Germán Molina
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
use bipv_radiation::{AnalysisInput, AnalysisSummary, ElementRadiationResult, PrecisionLevel};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Inputs {
    /// A JSON file with the configuration, elements, weather, walls and obstacles
    #[arg(short, long)]
    input: String,

    /// Where to write the results. They go to the standard output if not given
    #[arg(short, long)]
    output: Option<String>,

    /// Overrides the precision level of the input file
    #[arg(short, long)]
    precision: Option<PrecisionLevel>,

    /// Also reports the aggregated results
    #[arg(short, long)]
    summary: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    results: &'a [ElementRadiationResult],
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<AnalysisSummary>,
}

fn run(args: Inputs) -> bipv_radiation::Result<()> {
    let mut input = AnalysisInput::from_file(&args.input)?;
    if let Some(precision) = args.precision {
        input.config.precision_level = precision;
    }
    info!(
        input = %args.input,
        elements = input.elements.len(),
        weather_records = input.weather.len(),
        "read analysis input"
    );

    let results = input.run()?;
    let report = Report {
        results: &results,
        summary: args.summary.then(|| AnalysisSummary::from_results(&results)),
    };
    let json = serde_json::to_string_pretty(&report)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            info!(output = %path, "results written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Inputs::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
