use config::Config;
use portfolio::normalize::normalize;
use portfolio::{source, Options, PortfolioId, Report};
use report::data::Table;
use report::TableKind;

use chrono::{Local, NaiveDate};
use clap::builder::PossibleValuesParser;
use clap::Parser;
use env_logger::Env;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::{error::Error, fs::File};

use log::{debug, error, info};

const CONFIG_FILE: &str = ".portfolio-stat.yml";

enum OutputType {
    CSV,
    JSON,
    POLAR,
}

impl OutputType {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "csv" => Some(OutputType::CSV),
            "json" => Some(OutputType::JSON),
            "polar" => Some(OutputType::POLAR),
            _ => None,
        }
    }
}

trait Output {
    fn output(&self) -> Result<(), Box<dyn Error>>;
}

struct PolarOutput {
    tables: Vec<Table>,
}

impl PolarOutput {
    fn new(tables: Vec<Table>) -> Self {
        PolarOutput { tables }
    }
}

impl Output for PolarOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        for table in &self.tables {
            let df = report::to_dataframe(table)?;
            println!("{}", table.title);
            println!("{}", df);
        }
        Ok(())
    }
}

struct CsvOutput {
    dir: PathBuf,
    tables: Vec<Table>,
}

impl CsvOutput {
    fn new(dir: PathBuf, tables: Vec<Table>) -> Self {
        CsvOutput { dir, tables }
    }
}

impl Output for CsvOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        std::fs::create_dir_all(&self.dir)?;
        for table in &self.tables {
            let filename = self.dir.join(format!("{}.csv", table.name));
            let mut file = File::create(&filename)?;
            let mut df = report::to_dataframe(table)?;
            CsvWriter::new(&mut file).finish(&mut df)?;
            info!("CSV file written successfully: {:?}", filename);
        }
        Ok(())
    }
}

struct JsonOutput {
    tables: Vec<Table>,
}

impl JsonOutput {
    fn new(tables: Vec<Table>) -> Self {
        JsonOutput { tables }
    }
}

impl Output for JsonOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        println!("{}", report::to_json(&self.tables)?);
        Ok(())
    }
}

/// Descriptive statistics and KPIs for a debt portfolio dataset
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(
        short = 'F',
        long = "format",
        value_parser = PossibleValuesParser::new(["csv", "json", "polar"]),
        default_value = "polar",
        help = "output format"
    )]
    format: String,

    #[arg(long = "config", default_value = CONFIG_FILE, help = "yaml config file, optional")]
    config: String,

    #[arg(long = "source", help = "input csv file, overrides the config")]
    source: Option<String>,

    #[arg(
        long = "out-dir",
        default_value = "report",
        help = "directory for csv output"
    )]
    out_dir: PathBuf,

    /// reference date for customer age
    #[arg(long = "reference-date", value_parser = parse_date, help = "reference date for age, 2024-06-30, default today")]
    reference_date: Option<NaiveDate>,

    #[arg(long = "first", help = "first reference portfolio")]
    first: Option<String>,

    #[arg(long = "second", help = "second reference portfolio")]
    second: Option<String>,

    #[arg(long = "top", help = "rows per portfolio in city/county tables")]
    top: Option<usize>,

    #[arg(
        long = "table",
        value_parser = PossibleValuesParser::new(TableKind::ALL.map(|kind| kind.as_str())),
        help = "tables to output, repeatable, default all"
    )]
    tables: Vec<String>,

    #[arg(
        long = "detail",
        help = "write normalized records to a csv file, e.g. --detail detail.csv"
    )]
    detail: Option<String>,
}

fn parse_date(s: &str) -> Result<NaiveDate, Box<std::io::Error>> {
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => Ok(d),
        Err(e) => {
            error!("parse date err: {}", e);
            Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Invalid date format",
            )))
        }
    }
}

fn get_output(output_type: OutputType, out_dir: PathBuf, tables: Vec<Table>) -> Box<dyn Output> {
    match output_type {
        OutputType::CSV => Box::new(CsvOutput::new(out_dir, tables)),
        OutputType::JSON => Box::new(JsonOutput::new(tables)),
        OutputType::POLAR => Box::new(PolarOutput::new(tables)),
    }
}

fn write_detail(filename: &str, dataset: &portfolio::Dataset) -> Result<(), Box<dyn Error>> {
    let file = File::create(filename)?;
    source::write_detail(file, dataset)?;
    info!("detail csv file: {}", filename);
    Ok(())
}

fn selected_tables(names: &[String]) -> Vec<TableKind> {
    if names.is_empty() {
        return TableKind::ALL.to_vec();
    }
    names
        .iter()
        .filter_map(|name| TableKind::from_str(name))
        .collect()
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let conf = Config::load_or_default(&args.config)?;
    debug!("config: {:?}", conf);

    let source_file = args
        .source
        .clone()
        .unwrap_or_else(|| conf.source().to_string());
    let reference_date = args
        .reference_date
        .or(conf.reference_date)
        .unwrap_or_else(|| Local::now().date_naive());
    info!("source: {}, reference date: {}", source_file, reference_date);

    if !Path::new(&source_file).exists() {
        return Err(format!("source file not found: {}", source_file).into());
    }
    let raw = source::load_csv(&source_file)?;
    let dataset = normalize(&raw, reference_date);

    if let Some(detail) = &args.detail {
        write_detail(detail, &dataset)?;
    }

    let options = Options {
        first: args.first.or(conf.portfolios.first).map(PortfolioId::new),
        second: args.second.or(conf.portfolios.second).map(PortfolioId::new),
        top: args.top.or(conf.top),
    };
    debug!("options: {:?}", options);
    let analysis = Report::build(&dataset, &options)?;

    let tables = report::render(&analysis, &selected_tables(&args.tables));
    let out_type = OutputType::from_str(args.format.as_str()).ok_or("unknown output format")?;
    get_output(out_type, args.out_dir, tables).output()
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
