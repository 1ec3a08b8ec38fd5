//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::csv_signal_log::CsvSignalLog;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, DEFAULT_LOG_DIR};
use crate::domain::config_validation::{parse_bound, validate_backtest_config, validate_strategy};
use crate::domain::engine::build_engine;
use crate::domain::error::TraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::metrics::{self, MetricsReport, Trade};
use crate::domain::signal::SignalKind;
use crate::domain::strategy::{AdaptiveParams, CrossoverParams, Strategy, StrategyKind};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::signal_log_port::SignalLogPort;

#[derive(Parser, Debug)]
#[command(name = "trendsurfer", about = "Regime-adaptive trading strategy backtester")]
pub struct Cli {
    /// Debug-level diagnostics on stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest, write its signal log and print metrics
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar CSV, overrides [backtest] data_file
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// adaptive or crossover, overrides [strategy] kind
        #[arg(short, long)]
        strategy: Option<StrategyKind>,
        #[arg(long)]
        log_dir: Option<PathBuf>,
        /// Also export the metrics as Metric,Value CSV
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// Compute metrics for an existing signal log
    Analyze {
        #[arg(short, long)]
        log: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        risk_free_rate: f64,
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// Validate a configuration file and show resolved parameters
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            strategy,
            log_dir,
            report,
        } => run_backtest(
            &config,
            data.as_deref(),
            strategy,
            log_dir.as_deref(),
            report.as_deref(),
        ),
        Command::Analyze {
            log,
            risk_free_rate,
            report,
        } => run_analyze(&log, risk_free_rate, report.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: TraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

pub fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    kind_override: Option<StrategyKind>,
    log_dir_override: Option<&Path>,
    report_path: Option<&Path>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }

    // Stage 2: Resolve strategy and backtest settings
    let strategy = match build_strategy(&adapter, kind_override) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    if let Err(e) = validate_strategy(&strategy) {
        return fail(e);
    }
    let bt_config = match build_backtest_config(&adapter, data_override, log_dir_override) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let risk_free_rate = adapter.get_double("metrics", "risk_free_rate", 0.0);

    eprintln!("Loading strategy: {} ({})", strategy.name, strategy.kind);

    let data_port = CsvAdapter::new(bt_config.data_file.clone());
    let signal_log = CsvSignalLog::new(bt_config.log_dir.clone());
    run_backtest_pipeline(
        &data_port,
        &signal_log,
        &strategy,
        &bt_config,
        risk_free_rate,
        report_path,
    )
}

pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    data_override: Option<&Path>,
    log_dir_override: Option<&Path>,
) -> Result<BacktestConfig, TraderError> {
    let data_file = match data_override {
        Some(p) => p.to_path_buf(),
        None => adapter
            .get_non_empty("backtest", "data_file")
            .map(PathBuf::from)
            .ok_or_else(|| TraderError::ConfigMissing {
                section: "backtest".into(),
                key: "data_file".into(),
            })?,
    };
    let log_dir = match log_dir_override {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(
            adapter
                .get_non_empty("backtest", "log_dir")
                .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
        ),
    };

    Ok(BacktestConfig {
        data_file,
        log_dir,
        start: parse_bound(adapter, "start")?,
        end: parse_bound(adapter, "end")?,
    })
}

pub fn build_strategy(
    adapter: &dyn ConfigPort,
    kind_override: Option<StrategyKind>,
) -> Result<Strategy, TraderError> {
    let kind = match kind_override {
        Some(k) => k,
        None => match adapter.get_non_empty("strategy", "kind") {
            Some(raw) => raw.parse().map_err(|reason| TraderError::ConfigInvalid {
                section: "strategy".into(),
                key: "kind".into(),
                reason,
            })?,
            None => StrategyKind::Adaptive,
        },
    };

    let defaults = Strategy::new(kind);
    let a = AdaptiveParams::default();
    let c = CrossoverParams::default();

    Ok(Strategy {
        name: adapter
            .get_non_empty("strategy", "name")
            .unwrap_or(defaults.name),
        kind,
        adaptive: AdaptiveParams {
            ema_period: adapter.get_usize("strategy", "ema_period", a.ema_period),
            adx_period: adapter.get_usize("strategy", "adx_period", a.adx_period),
            rsi_period: adapter.get_usize("strategy", "rsi_period", a.rsi_period),
            atr_period: adapter.get_usize("strategy", "atr_period", a.atr_period),
            window: adapter.get_usize("strategy", "window", a.window),
            regime_window: adapter.get_usize("strategy", "regime_window", a.regime_window),
            initial_capital: adapter.get_double("strategy", "initial_capital", a.initial_capital),
            risk_per_trade: adapter.get_double("strategy", "risk_per_trade", a.risk_per_trade),
            trail_pct: adapter.get_double("strategy", "trail_pct", a.trail_pct),
        },
        crossover: CrossoverParams {
            short_period: adapter.get_usize("strategy", "short_period", c.short_period),
            long_period: adapter.get_usize("strategy", "long_period", c.long_period),
        },
    })
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    signal_log: &dyn SignalLogPort,
    strategy: &Strategy,
    bt_config: &BacktestConfig,
    risk_free_rate: f64,
    report_path: Option<&Path>,
) -> ExitCode {
    // Stage 3: Load bars
    let bars = match data_port.fetch_ohlcv(bt_config.start, bt_config.end) {
        Ok(b) => b,
        Err(e) => return fail(e),
    };
    if bars.is_empty() {
        eprintln!("warning: no bars in {}", bt_config.data_file.display());
    }
    eprintln!("Running backtest: {} bars", bars.len());

    // Stage 4: Run
    let mut engine = build_engine(strategy);
    let result = match backtest_engine::run_backtest(engine.as_mut(), &bars) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    eprintln!(
        "  Signals: {} BUY, {} SELL",
        result.count(SignalKind::Buy),
        result.count(SignalKind::Sell)
    );

    // Stage 5: Persist the signal log
    let log_path = match signal_log.write_signals(&result.strategy_name, &result.signals) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    eprintln!("Signal log written to: {}", log_path.display());

    // Stage 6: Analyse it
    match metrics::analyze_file(signal_log, &log_path, risk_free_rate) {
        Some((trades, report)) => {
            print_summary(&strategy.name, &trades, &report);
            export_report(&report, report_path)
        }
        None => {
            println!("No metrics available: no completed trades");
            ExitCode::SUCCESS
        }
    }
}

pub fn run_analyze(log_path: &Path, risk_free_rate: f64, report_path: Option<&Path>) -> ExitCode {
    let log_dir = log_path.parent().unwrap_or(Path::new("."));
    let signal_log = CsvSignalLog::new(log_dir);
    match metrics::analyze_file(&signal_log, log_path, risk_free_rate) {
        Some((trades, report)) => {
            let name = log_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            print_summary(&name, &trades, &report);
            export_report(&report, report_path)
        }
        None => {
            println!("No metrics available for {}", log_path.display());
            ExitCode::SUCCESS
        }
    }
}

fn export_report(report: &MetricsReport, report_path: Option<&Path>) -> ExitCode {
    let Some(path) = report_path else {
        return ExitCode::SUCCESS;
    };
    match CsvReportAdapter.write(report, path) {
        Ok(()) => {
            eprintln!("Report written to: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

pub fn format_summary(name: &str, trades: &[Trade], report: &MetricsReport) -> String {
    let mut out = format!("=== {} ===\n", name);
    out.push_str(&format!("{:<16}{}\n", "Trades", trades.len()));
    for (key, value) in report.entries() {
        let cell = match value {
            Some(v) if v.is_infinite() => "inf".to_string(),
            Some(v) => format!("{:.2}", v),
            None => "n/a".to_string(),
        };
        out.push_str(&format!("{:<16}{}\n", key, cell));
    }
    let best = metrics::highest_win(&metrics::pnls(trades));
    out.push_str(&format!("{:<16}{:.2}\n", "Highest Win", best));
    out
}

fn print_summary(name: &str, trades: &[Trade], report: &MetricsReport) {
    print!("{}", format_summary(name, trades, report));
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }
    let strategy = match build_strategy(&adapter, None) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    if let Err(e) = validate_strategy(&strategy) {
        return fail(e);
    }

    println!("Strategy: {} ({})", strategy.name, strategy.kind);
    match strategy.kind {
        StrategyKind::Adaptive => {
            let p = &strategy.adaptive;
            println!("  capital:        {}", p.initial_capital);
            println!("  risk_per_trade: {}", p.risk_per_trade);
            println!("  trail_pct:      {}", p.trail_pct);
            println!("  window:         {} bars", p.window);
            println!("  warmup:         {} bars", p.warmup());
            println!("  full history:   {} bars", p.required_history());
        }
        StrategyKind::Crossover => {
            println!("  window:         {} bars", strategy.crossover.window());
        }
    }

    println!("\nIndicators:");
    for ind in strategy.indicators() {
        println!("  {:<20} lookback {}", ind.to_string(), IndicatorType::lookback(&ind));
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn cli_parses_backtest_overrides() {
        let cli = Cli::try_parse_from([
            "trendsurfer",
            "--verbose",
            "backtest",
            "-c",
            "cfg.ini",
            "--strategy",
            "crossover",
            "--data",
            "bars.csv",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Backtest {
                strategy, data, ..
            } => {
                assert_eq!(strategy, Some(StrategyKind::Crossover));
                assert_eq!(data, Some(PathBuf::from("bars.csv")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_rejects_unknown_strategy() {
        let result = Cli::try_parse_from([
            "trendsurfer",
            "backtest",
            "-c",
            "cfg.ini",
            "--strategy",
            "martingale",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn build_strategy_defaults_to_adaptive() {
        let s = build_strategy(&adapter("[strategy]\n"), None).unwrap();
        assert_eq!(s.kind, StrategyKind::Adaptive);
        assert_eq!(s.name, "TrendSurferStrategy");
        assert_eq!(s.adaptive, AdaptiveParams::default());
    }

    #[test]
    fn build_strategy_reads_overrides() {
        let s = build_strategy(
            &adapter("[strategy]\nkind = crossover\nshort_period = 5\nlong_period = 15\n"),
            None,
        )
        .unwrap();
        assert_eq!(s.kind, StrategyKind::Crossover);
        assert_eq!(s.name, "SMA_Strategy");
        assert_eq!(s.crossover.short_period, 5);
        assert_eq!(s.crossover.long_period, 15);

        let s = build_strategy(&adapter("[strategy]\nkind = crossover\n"), Some(StrategyKind::Adaptive))
            .unwrap();
        assert_eq!(s.kind, StrategyKind::Adaptive);
    }

    #[test]
    fn build_strategy_rejects_unknown_kind() {
        let result = build_strategy(&adapter("[strategy]\nkind = grid\n"), None);
        assert!(matches!(result, Err(TraderError::ConfigInvalid { .. })));
    }

    #[test]
    fn build_backtest_config_requires_data_file() {
        let result = build_backtest_config(&adapter("[backtest]\n"), None, None);
        assert!(matches!(result, Err(TraderError::ConfigMissing { .. })));

        let c = build_backtest_config(&adapter("[backtest]\n"), Some(Path::new("bars.csv")), None)
            .unwrap();
        assert_eq!(c.data_file, PathBuf::from("bars.csv"));
        assert_eq!(c.log_dir, PathBuf::from("log"));
        assert_eq!(c.start, None);
    }

    #[test]
    fn format_summary_lists_every_metric() {
        let trades = vec![Trade {
            entry_timestamp: "t1".into(),
            exit_timestamp: "t2".into(),
            entry_price: 100.0,
            exit_price: 110.0,
            pnl: 10.0,
        }];
        let report = MetricsReport::from_trades(&trades, 0.0);
        let text = format_summary("SMA_Strategy", &trades, &report);
        assert!(text.starts_with("=== SMA_Strategy ==="));
        assert!(text.contains("Total Return    10.00"));
        assert!(text.contains("Profit Factor   inf"));
        assert!(text.contains("Sharpe Ratio    n/a"));
        assert!(text.contains("Highest Win     10.00"));
    }
}
