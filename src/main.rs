use anyhow::{Context, Result};
use candle_signals::prelude::*;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "candle-signals")]
#[command(about = "Range filter and ICT-style signal generation over OHLC candles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //analyze candles and print the signals
    Run {
        //path to csv data file
        #[arg(long)]
        data: Option<PathBuf>,

        //strategy type (range_filter, ict, optimized_ict, two_bullish)
        #[arg(long)]
        strategy: Option<String>,

        //json configuration file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        //only analyze this pair (eg BTC/USDT)
        #[arg(long)]
        pair: Option<String>,

        //timeframe reported in pair metadata (eg 5m)
        #[arg(long)]
        timeframe: Option<String>,

        //range filter parameters
        //range period
        #[arg(long)]
        rng_per: Option<usize>,

        //range multiplier
        #[arg(long)]
        rng_qty: Option<f64>,

        //exit policy (unconditional, gated)
        #[arg(long)]
        exit_policy: Option<String>,

        //output options
        //output path for the analyzed frame csv
        #[arg(long)]
        output_frame_csv: Option<PathBuf>,

        //output path for the signal events csv
        #[arg(long)]
        output_signals_csv: Option<PathBuf>,
    },
    //write a default configuration file
    InitConfig {
        //strategy type
        #[arg(long)]
        strategy: String,

        //where to write the json
        #[arg(long)]
        output: PathBuf,

        //data path stored in the file
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    //logs go to stderr so tables on stdout stay clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            strategy,
            config,
            pair,
            timeframe,
            rng_per,
            rng_qty,
            exit_policy,
            output_frame_csv,
            output_signals_csv,
        } => {
            let overrides = ConfigOverrides {
                data,
                strategy,
                pair,
                timeframe,
                rng_per,
                rng_qty,
                exit_policy,
                output_frame_csv,
                output_signals_csv,
            };
            let configuration = resolve_configuration(config.as_ref(), overrides)?;
            run_analysis(&configuration)?;
        }
        Commands::InitConfig {
            strategy,
            output,
            data,
        } => {
            let strategy_type = parse_strategy(&strategy)?;
            let mut configuration = StrategyConfiguration::for_strategy(strategy_type);
            if let Some(data) = data {
                configuration.data_path = data;
            }
            configuration
                .to_json_file(&output)
                .context(format!("Failed to write configuration to {:?}", output))?;
            info!(strategy = %strategy_type, path = ?output, "Configuration written");
        }
    }

    Ok(())
}

fn run_analysis(configuration: &StrategyConfiguration) -> Result<()> {
    let strategy = build_strategy(configuration.strategy_type, &configuration.strategy_params)?;
    let timeframe = configuration
        .timeframe
        .clone()
        .unwrap_or_else(|| strategy.settings().timeframe.clone());

    info!(strategy = strategy.name(), timeframe = %timeframe, "Strategy ready");

    //load data
    let data_path = &configuration.data_path;
    let candles =
        load_csv(data_path).context(format!("Failed to load data from {:?}", data_path))?;

    let groups: Vec<(String, Vec<Candle>)> = match &configuration.pair {
        Some(pair) => vec![(pair.clone(), filter_by_pair(&candles, pair))],
        None => group_by_pair(candles).into_iter().collect(),
    };

    if groups.iter().all(|(_, c)| c.is_empty()) {
        anyhow::bail!("No candles found in {:?}", data_path);
    }

    info!(pairs = groups.len(), "Analyzing");

    //pairs are independent, analyze them in parallel
    let analyzed: Vec<(String, Frame)> = groups
        .into_par_iter()
        .filter(|(_, candles)| !candles.is_empty())
        .map(|(pair, candles)| -> Result<(String, Frame)> {
            let metadata = PairMetadata::new(pair.clone(), timeframe.clone());
            let frame = analyze(strategy.as_ref(), candles, &metadata)
                .context(format!("Analysis failed for {}", pair))?;
            Ok((pair, frame))
        })
        .collect::<Result<_>>()?;

    let summaries: Vec<SignalSummary> = analyzed
        .iter()
        .map(|(pair, frame)| SignalSummary::from_frame(strategy.name(), pair, frame))
        .collect();

    for summary in &summaries {
        summary.pretty_print_table();
    }
    if summaries.len() > 1 {
        pairs_table(&summaries).printstd();
    }

    //save outputs if requested
    if let Some(path) = &configuration.output_frame_csv {
        write_frame_csv(&analyzed, path)?;
        info!(path = ?path, "Frame saved");
    }

    if let Some(path) = &configuration.output_signals_csv {
        let events: Vec<SignalEvent> = analyzed
            .iter()
            .flat_map(|(_, frame)| collect_events(frame))
            .collect();
        write_signals_csv(&events, path)?;
        info!(path = ?path, events = events.len(), "Signals saved");
    }

    Ok(())
}
