use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use std::path::PathBuf;

use dxcompare_cli::config::PipelineConfig;
use dxcompare_cli::logging::init_logging;
use dxcompare_cli::pipeline::{run_analysis, run_pipeline};

fn config_arg() -> Arg {
    Arg::new("config")
        .help("Path to the pipeline JSON configuration file. Defaults are used when omitted.")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn data_args() -> Vec<Arg> {
    vec![
        Arg::new("input")
            .short('i')
            .long("input")
            .help("Path to the input CSV file. Overrides the input specified in the configuration file.")
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath),
        Arg::new("output_dir")
            .short('o')
            .long("output-dir")
            .help("Directory that plots, results and the report are written to.")
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::DirPath),
        Arg::new("log_file")
            .long("log-file")
            .help("File that log records are appended to.")
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath),
        Arg::new("fill")
            .long("fill")
            .help("Fill missing values before analysis.")
            .value_parser(["mean", "median", "most_frequent"]),
    ]
}

fn main() -> Result<()> {
    let matches = Command::new("dxcompare")
        .version(clap::crate_version!())
        .about("\u{1FA7A} dxcompare - Compare classifiers on a clinical diagnosis table")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Analyze the table, then train and compare every configured classifier")
                .arg(config_arg())
                .args(data_args())
                .arg(
                    Arg::new("metric")
                        .short('m')
                        .long("metric")
                        .help("Metric used to pick the best classifier.")
                        .value_parser(["Accuracy", "F1 Score", "Precision", "Recall"]),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed of the train/test shuffle.")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("test_size")
                        .long("test-size")
                        .help("Fraction of rows held out for testing, between 0 and 1.")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("models")
                        .long("models")
                        .help(
                            "Comma separated list of classifiers to compare, e.g. \
                             'knn,decision_tree,dummy'. Replaces the configured list.",
                        )
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .help("Evaluate the classifiers of a batch concurrently.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no_ensembles")
                        .long("no-ensembles")
                        .help("Skip the voting and stacking ensembles.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("analyze")
                .about("Load and describe the table without training")
                .arg(config_arg())
                .args(data_args()),
        )
        .subcommand(
            Command::new("config").about("Print the default configuration as JSON"),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("run", sub_m)) => handle_run(sub_m),
        Some(("analyze", sub_m)) => handle_analyze(sub_m),
        Some(("config", _)) => {
            println!("{}", PipelineConfig::default().to_json()?);
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_run(matches: &ArgMatches) -> Result<()> {
    let config = PipelineConfig::from_arguments(matches)?;
    let _guard = init_logging(&config.log_file)?;
    log::info!("[dxcompare] Reading {:?}", config.input);

    match run_pipeline(&config) {
        Ok(outcome) => {
            let best: Vec<&str> = outcome.best.iter().map(|r| r.name.as_str()).collect();
            log::info!(
                "[dxcompare] Evaluated {} classifier(s); best by {}: {}",
                outcome.results.len(),
                config.best_metric,
                best.join(", ")
            );
            log::info!(
                "[dxcompare] Results: {:?}, report: {:?}",
                outcome.results_csv,
                outcome.report
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Run failed: {:#}", e);
            log::logger().flush();
            std::process::exit(1)
        }
    }
}

fn handle_analyze(matches: &ArgMatches) -> Result<()> {
    let config = PipelineConfig::from_arguments(matches)?;
    let _guard = init_logging(&config.log_file)?;
    log::info!("[dxcompare] Analyzing {:?}", config.input);

    match run_analysis(&config) {
        Ok(data) => {
            log::info!(
                "[dxcompare] Analysis finished on {} rows x {} columns",
                data.n_rows(),
                data.n_cols()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Analysis failed: {:#}", e);
            log::logger().flush();
            std::process::exit(1)
        }
    }
}
