// otlens CLI - headless work-order reconciliation and KPI reports

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use otlens_engine::{load_csv_rows, run, EngineConfig, FilterState, Report};

use exit_codes::{EXIT_DATA, EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "otlens")]
#[command(about = "Work-order reconciliation and KPI reports (headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation report from a TOML config file
    #[command(after_help = "\
Examples:
  otlens run close.toml
  otlens run close.toml --json
  otlens run close.toml --output report.json
  otlens run close.toml --year 2024 --month 3
  otlens run close.toml --workshop 'Taller Norte' --where Zona=Norte")]
    Run {
        /// Path to the config file
        config: PathBuf,

        /// Output JSON report to stdout instead of just the summary
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Billing year filter
        #[arg(long)]
        year: Option<i32>,

        /// Billing month filter (1-12, needs --year to take effect)
        #[arg(long)]
        month: Option<u32>,

        /// Workshop filter (exact name)
        #[arg(long)]
        workshop: Option<String>,

        /// Custom field filter, FIELD=VALUE. Repeatable.
        #[arg(long, value_name = "FIELD=VALUE")]
        r#where: Vec<String>,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  otlens validate close.toml")]
    Validate {
        /// Path to the config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            json,
            output,
            year,
            month,
            workshop,
            r#where,
        } => cmd_run(config, json, output, year, month, workshop, r#where),
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {message}");
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    fn data(msg: impl Into<String>) -> Self {
        Self { code: EXIT_DATA, message: msg.into(), hint: None }
    }

    fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn load_config(config_path: &Path) -> Result<EngineConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| CliError::config(format!("cannot read config: {e}")))?;
    EngineConfig::from_toml(&config_str).map_err(|e| CliError::config(e.to_string()))
}

/// Split a `FIELD=VALUE` clause; the value may itself contain `=`.
fn parse_where_clause(clause: &str) -> Result<(String, String), CliError> {
    match clause.split_once('=') {
        Some((field, value)) if !field.is_empty() => {
            Ok((field.to_string(), value.to_string()))
        }
        _ => Err(CliError::usage(format!("malformed --where clause: '{clause}'"))
            .with_hint("expected FIELD=VALUE, e.g. --where Zona=Norte")),
    }
}

fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    year: Option<i32>,
    month: Option<u32>,
    workshop: Option<String>,
    where_clauses: Vec<String>,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Source CSV resolves relative to the config file's directory.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let csv_path = base_dir.join(&config.file);
    let csv_data = std::fs::read_to_string(&csv_path)
        .map_err(|e| CliError::data(format!("cannot read {}: {e}", csv_path.display())))?;
    let rows = load_csv_rows(&csv_data, &config.columns)
        .map_err(|e| CliError::data(e.to_string()))?;

    // Flags override the config's preset filter, criterion by criterion.
    let mut state: FilterState = config.filter.clone();
    if year.is_some() {
        state.year = year;
    }
    if month.is_some() {
        state.month = month;
    }
    if workshop.is_some() {
        state.workshop = workshop;
    }
    for clause in &where_clauses {
        let (field, value) = parse_where_clause(clause)?;
        state.custom.insert(field, value);
    }

    let report = run(&config, &rows, &state);

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::general(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&report);

    Ok(())
}

/// Human summary to stderr; stdout is reserved for the JSON report.
fn print_summary(report: &Report) {
    let a = &report.audit;
    eprintln!(
        "'{}': {} rows — {} empty, {} duplicates removed, {} internal-client records",
        report.meta.config_name, a.total_rows, a.empty_rows, a.duplicates_removed,
        a.internal_clients,
    );

    let c = &report.compliance;
    eprintln!(
        "compliance: {} OTs — {} on time, {} late, {} pending ({:.2}%)",
        c.total_ots, c.on_time, c.late, c.pending, c.average_compliance,
    );

    let f = &report.financial;
    eprintln!(
        "financial: {} records, total {:.2}",
        f.total_ots, f.total_amount,
    );

    eprintln!(
        "claims: {} rows across {} OTs, total {:.2}",
        report.claims.rows, report.claims.distinct_ots, report.claims.total_amount,
    );
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    eprintln!(
        "valid: '{}' reading {} ({} extra filter field(s), {} internal client code(s))",
        config.name,
        config.file,
        config.columns.extra.len(),
        config.clients.internal.len(),
    );

    Ok(())
}
