//! oceanbase-typemap CLI - inspect OceanBase type mappings and SQL fragments.

use clap::{Parser, Subcommand};
use oceanbase_connector::{
    BackendTypeDescriptor, CompatibleMode, ConnectorConfig, ConnectorError, JdbcType,
    LogicalType, OceanBaseClient,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "oceanbase-typemap")]
#[command(about = "Inspect OceanBase type mappings and SQL fragments")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compatible mode: mysql or oracle (overrides the config file)
    #[arg(long)]
    mode: Option<String>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the logical type of a backend column
    Read {
        /// Driver type code (4 = INTEGER, 3 = DECIMAL, 93 = TIMESTAMP, ...)
        #[arg(long, allow_negative_numbers = true)]
        type_code: i32,

        /// Backend type name [default: the type code's name]
        #[arg(long)]
        type_name: Option<String>,

        /// Declared column size
        #[arg(long, allow_negative_numbers = true)]
        column_size: Option<i32>,

        /// Declared decimal digits
        #[arg(long, allow_negative_numbers = true)]
        decimal_digits: Option<i32>,
    },

    /// Show the DDL type and bind strategy for a logical type
    Write {
        /// Logical type, e.g. varchar(10), decimal(12,2), timestamp(3) with time zone
        logical_type: String,
    },

    /// Show the pagination fragment for a query
    Limit {
        /// Maximum number of rows
        #[arg(long)]
        limit: u64,

        /// Query to restrict
        sql: String,
    },

    /// Validate the configuration and print driver connection properties
    CheckConfig,
}

#[derive(Serialize)]
struct ReadOutput {
    mode: CompatibleMode,
    logical_type: Option<String>,
    read: Option<&'static str>,
    write: Option<&'static str>,
    pushdown: Option<&'static str>,
}

#[derive(Serialize)]
struct WriteOutput {
    mode: CompatibleMode,
    logical_type: String,
    data_type: String,
    write: &'static str,
    bind_expression: String,
}

#[derive(Serialize)]
struct LimitOutput {
    mode: CompatibleMode,
    sql: String,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), ConnectorError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| ConnectorError::InvalidConfiguration(e.to_string()))?;

    let config = match &cli.config {
        Some(path) => {
            let config = ConnectorConfig::load(path)?;
            info!("Loaded configuration from {:?}", path);
            Some(config)
        }
        None => None,
    };

    if let Commands::CheckConfig = cli.command {
        let config = config.ok_or_else(|| {
            ConnectorError::InvalidConfiguration("check-config requires --config".to_string())
        })?;
        return check_config(&config, cli.output_json);
    }

    let client = build_client(config, cli.mode.as_deref())?;
    debug!("Using {} mode", client.mode());

    match cli.command {
        Commands::CheckConfig => unreachable!(), // Handled above
        Commands::Read {
            type_code,
            type_name,
            column_size,
            decimal_digits,
        } => {
            let jdbc_type = JdbcType::from_code(type_code);
            let type_name = type_name
                .or_else(|| jdbc_type.name().map(str::to_lowercase))
                .unwrap_or_else(|| type_code.to_string());
            let mut descriptor = BackendTypeDescriptor::new(jdbc_type, type_name);
            descriptor.column_size = column_size;
            descriptor.decimal_digits = decimal_digits;

            let mapping = client.to_column_mapping(&descriptor)?;
            let output = ReadOutput {
                mode: client.mode(),
                logical_type: mapping.as_ref().map(|m| m.logical_type.to_string()),
                read: mapping.as_ref().map(|m| m.read.name()),
                write: mapping.as_ref().map(|m| m.write.name()),
                pushdown: mapping.as_ref().map(|m| m.pushdown.as_str()),
            };

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                match (output.logical_type, output.read, output.write, output.pushdown) {
                    (Some(logical_type), Some(read), Some(write), Some(pushdown)) => {
                        println!("Logical type: {}", logical_type);
                        println!("Read:         {}", read);
                        println!("Write:        {}", write);
                        println!("Pushdown:     {}", pushdown);
                    }
                    _ => println!("unsupported"),
                }
            }
        }
        Commands::Write { logical_type } => {
            let parsed: LogicalType = logical_type.parse()?;
            let mapping = client.to_write_mapping(&parsed)?;
            let output = WriteOutput {
                mode: client.mode(),
                logical_type: parsed.to_string(),
                data_type: mapping.data_type,
                write: mapping.write.name(),
                bind_expression: mapping.write.bind_expression().into_owned(),
            };

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Logical type:    {}", output.logical_type);
                println!("Data type:       {}", output.data_type);
                println!("Write:           {}", output.write);
                println!("Bind expression: {}", output.bind_expression);
            }
        }
        Commands::Limit { limit, sql } => {
            let output = LimitOutput {
                mode: client.mode(),
                sql: client.limit(&sql, limit),
            };
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", output.sql);
            }
        }
    }

    Ok(())
}

/// Client from the config file when given; `--mode` wins over the file.
fn build_client(
    config: Option<ConnectorConfig>,
    mode: Option<&str>,
) -> Result<OceanBaseClient, ConnectorError> {
    let mode = mode.map(CompatibleMode::parse).transpose()?;
    match config {
        Some(mut config) => {
            if let Some(mode) = mode {
                config.compatible_mode = mode;
            }
            OceanBaseClient::new(&config)
        }
        None => Ok(OceanBaseClient::for_mode(mode.unwrap_or_default())),
    }
}

fn check_config(config: &ConnectorConfig, output_json: bool) -> Result<(), ConnectorError> {
    config.validate()?;
    config.forced_varchar_types()?;
    let properties = config.connection_properties();

    if output_json {
        let map: serde_json::Map<String, serde_json::Value> = properties
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        let output = serde_json::json!({
            "valid": true,
            "compatible_mode": config.compatible_mode,
            "connection_properties": map,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Configuration is valid ({} mode)", config.compatible_mode);
        for (key, value) in properties {
            println!("{}={}", key, value);
        }
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("Unknown verbosity: {}", other)),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("Unknown log format: {}", other)),
    }

    Ok(())
}
