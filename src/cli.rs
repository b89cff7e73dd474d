//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_ledger_adapter::CsvLedgerAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_adapter::JsonAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult, RunConfig};
use crate::domain::config_validation::{
    read_data_format, read_date, read_float_list, read_gain_accounting, read_int_list,
    read_positive_float, read_positive_int, read_stddev_kind, read_strategy_kind,
    validate_run_config, validate_sweep_config, DataFormat, DEFAULT_INITIAL_BALANCE,
};
use crate::domain::error::TradesimError;
use crate::domain::metrics::SummaryMetrics;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::StrategyParams;
use crate::domain::sweep::{ParamGrid, ParamSweep, SweepResults};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::ledger_port::LedgerPort;

pub const DEFAULT_LEDGER_PATH: &str = "trade_log.csv";
pub const DEFAULT_DATA_DIR: &str = ".";

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Single-symbol strategy backtester")]
pub struct Cli {
    /// Default log level; RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: Level,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the trade ledger
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        no_ledger: bool,
    },
    /// Run the strategy over a parameter grid
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long, default_value_t = 10)]
        top: usize,
        #[arg(long)]
        sequential: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range for a symbol, or for every symbol in the data directory
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            data_dir,
            output,
            no_ledger,
        } => run_backtest(
            &config,
            symbol.as_deref(),
            data_dir.as_deref(),
            output.as_deref(),
            no_ledger,
        ),
        Command::Sweep {
            config,
            symbol,
            top,
            sequential,
        } => run_sweep(&config, symbol.as_deref(), top, sequential),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

fn fail(err: &TradesimError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    data_dir_override: Option<&Path>,
    output_override: Option<&Path>,
    no_ledger: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_run_config(&adapter) {
        return fail(&e);
    }

    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let params = match build_strategy_params(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let run_config = match build_run_config(&adapter, &symbol) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let data_port = match build_data_port(&adapter, data_dir_override) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let ledger_path = if no_ledger {
        None
    } else {
        Some(resolve_ledger_path(output_override, &adapter))
    };
    let ledger_adapter = CsvLedgerAdapter::new();
    let ledger_sink = ledger_path
        .as_deref()
        .map(|path| (&ledger_adapter as &dyn LedgerPort, path));

    let (start, end) = match build_date_range(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    eprintln!("Running {} on {}", params, symbol);
    match run_backtest_pipeline(
        data_port.as_ref(),
        &params,
        &run_config,
        start,
        end,
        ledger_sink,
    ) {
        Ok(result) => {
            println!("{}", format_summary(&result.metrics));
            if let Some(path) = ledger_path {
                eprintln!("Trade log written to: {}", path);
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// Load bars, run the backtest and write the ledger when a sink is given.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    params: &StrategyParams,
    run_config: &RunConfig,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    ledger_sink: Option<(&dyn LedgerPort, &str)>,
) -> Result<BacktestResult, TradesimError> {
    let bars = load_bars(data_port, &run_config.symbol, start, end)?;
    info!(
        symbol = %run_config.symbol,
        bars = bars.len(),
        lookback = params.lookback(),
        strategy = %params,
        "running backtest"
    );

    let result = backtest_engine::run_backtest(&bars, params, run_config)?;

    if let Some((ledger_port, path)) = ledger_sink {
        ledger_port.write_ledger(&result.ledger, path)?;
    }
    Ok(result)
}

pub fn load_bars(
    data_port: &dyn DataPort,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<OhlcvBar>, TradesimError> {
    let bars = data_port.fetch_bars(symbol, start, end)?;
    if bars.is_empty() {
        return Err(TradesimError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(bars)
}

pub fn format_summary(metrics: &SummaryMetrics) -> String {
    format!(
        "Total Gain/Loss: ${:.2}\nTotal Return: {:.2}%\nAnnual Return: {:.2}%\nFinal Balance: ${:.2}",
        metrics.total_gain_loss,
        metrics.total_return_pct,
        metrics.annualized_return_pct,
        metrics.final_balance,
    )
}

fn run_sweep(config_path: &Path, symbol_override: Option<&str>, top: usize, sequential: bool) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_run_config(&adapter).and_then(|_| validate_sweep_config(&adapter)) {
        return fail(&e);
    }

    let outcome = resolve_symbol(symbol_override, &adapter).and_then(|symbol| {
        let params = build_strategy_params(&adapter)?;
        let run_config = build_run_config(&adapter, &symbol)?;
        let grid = build_param_grid(&adapter)?;
        let data_port = build_data_port(&adapter, None)?;
        let (start, end) = build_date_range(&adapter)?;
        let parallel = !sequential && adapter.get_bool("sweep", "parallel", true);

        let bars = load_bars(data_port.as_ref(), &symbol, start, end)?;
        eprintln!("Sweeping {} on {} ({} bars)", params.kind(), symbol, bars.len());
        ParamSweep::new()
            .with_parallelism(parallel)
            .sweep(&bars, &grid, &params, &run_config)
    });

    match outcome {
        Ok(results) => {
            print!("{}", format_sweep(&results, top));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

pub fn format_sweep(results: &SweepResults, top: usize) -> String {
    let mut out = format!(
        "{:<4} {:<36} {:>12} {:>12} {:>8}\n",
        "Rank", "Parameters", "Return %", "Annual %", "Trades"
    );
    for (rank, entry) in results.top(top).iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<36} {:>12.2} {:>12.2} {:>8}\n",
            rank + 1,
            entry.params.to_string(),
            entry.metrics.total_return_pct,
            entry.metrics.annualized_return_pct,
            entry.metrics.trade_count,
        ));
    }
    out
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = validate_run_config(&adapter)
        .and_then(|_| validate_sweep_config(&adapter))
        .and_then(|_| build_strategy_params(&adapter));

    match result {
        Ok(params) => {
            println!("Configuration is valid: {}", params);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_info(config_path: &Path, symbol_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_port = match build_data_port(&adapter, None) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let symbols = match symbol_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("backtest", "symbol"))
    {
        Some(s) => vec![s],
        None => match data_port.list_symbols() {
            Ok(s) => s,
            Err(e) => return fail(&e),
        },
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
        return ExitCode::SUCCESS;
    }

    for symbol in &symbols {
        match data_port.get_data_range(symbol) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} to {} ({} bars)", symbol, first, last, count)
            }
            Ok(None) => println!("{}: no data", symbol),
            Err(e) => return fail(&e),
        }
    }
    ExitCode::SUCCESS
}

/// `--symbol` wins over `[backtest] symbol`.
pub fn resolve_symbol(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, TradesimError> {
    symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("backtest", "symbol"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TradesimError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        })
}

pub fn resolve_ledger_path(output_override: Option<&Path>, config: &dyn ConfigPort) -> String {
    output_override
        .map(|p| p.display().to_string())
        .or_else(|| config.get_string("report", "ledger_path"))
        .unwrap_or_else(|| DEFAULT_LEDGER_PATH.to_string())
}

pub fn build_run_config(config: &dyn ConfigPort, symbol: &str) -> Result<RunConfig, TradesimError> {
    Ok(RunConfig {
        symbol: symbol.to_string(),
        initial_balance: read_positive_float(
            config,
            "backtest",
            "initial_balance",
            DEFAULT_INITIAL_BALANCE,
        )?,
        gain_accounting: read_gain_accounting(config)?,
    })
}

pub fn build_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, TradesimError> {
    let kind = read_strategy_kind(config)?;
    if kind == StrategyParams::SMA_CROSSOVER {
        Ok(StrategyParams::SmaCrossover {
            short_window: read_positive_int(config, "strategy", "short_window", 50)?,
            long_window: read_positive_int(config, "strategy", "long_window", 200)?,
        })
    } else {
        Ok(StrategyParams::Bollinger {
            window: read_positive_int(config, "strategy", "window", 20)?,
            num_std_dev: read_positive_float(config, "strategy", "num_std_dev", 2.0)?,
            stddev: read_stddev_kind(config)?,
        })
    }
}

pub fn build_param_grid(config: &dyn ConfigPort) -> Result<ParamGrid, TradesimError> {
    Ok(ParamGrid {
        short_windows: read_int_list(config, "sweep", "short_windows")?,
        long_windows: read_int_list(config, "sweep", "long_windows")?,
        windows: read_int_list(config, "sweep", "windows")?,
        num_std_devs: read_float_list(config, "sweep", "num_std_devs")?,
    })
}

pub fn build_date_range(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), TradesimError> {
    Ok((
        read_date(config, "data", "start_date")?,
        read_date(config, "data", "end_date")?,
    ))
}

/// `--data-dir` wins over `[data] directory`.
pub fn build_data_port(
    config: &dyn ConfigPort,
    data_dir_override: Option<&Path>,
) -> Result<Box<dyn DataPort>, TradesimError> {
    let dir = data_dir_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "directory").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    Ok(match read_data_format(config)? {
        DataFormat::Json => Box::new(JsonAdapter::new(dir)),
        DataFormat::Csv => Box::new(CsvAdapter::new(dir)),
    })
}
