// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! MQTT to InfluxDB bridge CLI
//!
//! Replays `topic<TAB>payload` lines and prints InfluxDB Line Protocol.
//!
//! # Usage
//!
//! ```bash
//! # Numeric/text detection (default)
//! mosquitto_sub -t '#' -F '%t\t%p' | mqtt-influx
//!
//! # Flatten JSON payloads
//! mqtt-influx --mode mapFields --input capture.tsv
//!
//! # Using configuration file
//! mqtt-influx --config bridge.toml
//! ```

use clap::{Parser, Subcommand};
use mqtt_influx::{
    BridgeConfig, ConfigError, LineProtocolSink, MessageParser, NumericMode, Payload, PayloadMode,
    RecordSink, WriteStatsSnapshot,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// MQTT to InfluxDB bridge
#[derive(Parser, Debug)]
#[command(name = "mqtt-influx")]
#[command(about = "Normalize topic/payload messages into InfluxDB Line Protocol")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Payload mode (static, auto, mapFields)
    #[arg(short, long)]
    mode: Option<String>,

    /// Numeric parser mode (strict, tolerant, eager)
    #[arg(long)]
    numeric_parser_mode: Option<String>,

    /// Field name for static mode
    #[arg(long)]
    static_field: Option<String>,

    /// Field name for text payloads
    #[arg(long)]
    text_field: Option<String>,

    /// Field name for numeric payloads
    #[arg(long)]
    numeric_field: Option<String>,

    /// Lines per output batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Input file (defaults to stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "mqtt-influx.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(cmd) = args.command {
        return match cmd {
            Commands::GenConfig { output } => cmd_gen_config(output),
            Commands::Validate { config } => cmd_validate(config),
        };
    }

    let config = build_config(&args)?;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let parser = MessageParser::new(&config.parser)?;
    let mut sink = LineProtocolSink::new(&config.output);
    let stats = sink.stats();

    tracing::info!(
        "{} started (mode: {}, numeric parser: {})",
        config.name,
        parser.mode(),
        config.parser.numeric_parser_mode
    );

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stats_interval = Duration::from_secs(config.stats_interval_secs);
    let mut last_stats = Instant::now();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let id = index + 1;
        let (topic, payload) = split_message(&line);

        match parser.parse(id, topic, &Payload::from(payload)) {
            Ok(Some(records)) => {
                // failures are already logged by the sink
                let _ = sink.store(&id, topic, &records, now_ns());
            }
            Ok(None) => {}
            Err(e) if e.is_message_local() => {
                tracing::warn!("Message #{} ({}) skipped: {}", id, topic, e)
            }
            Err(e) => return Err(e.into()),
        }

        for batch in sink.take_ready() {
            write_batch(&mut out, &batch)?;
        }

        if !stats_interval.is_zero() && last_stats.elapsed() >= stats_interval {
            log_stats(&stats.collect());
            last_stats = Instant::now();
        }
    }

    write_batch(&mut out, &sink.flush_all())?;
    out.flush()?;

    log_stats(&stats.collect());
    Ok(())
}

fn build_config(args: &Args) -> Result<BridgeConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => BridgeConfig::from_file(path)?,
        None => BridgeConfig::default(),
    };

    if let Some(ref mode) = args.mode {
        config.parser.mode = mode.parse::<PayloadMode>()?;
    }
    if let Some(ref mode) = args.numeric_parser_mode {
        config.parser.numeric_parser_mode = mode.parse::<NumericMode>()?;
    }
    if let Some(ref field) = args.static_field {
        config.parser.static_field = field.clone();
    }
    if let Some(ref field) = args.text_field {
        config.parser.text_field = field.clone();
    }
    if let Some(ref field) = args.numeric_field {
        config.parser.numeric_field = field.clone();
    }
    if let Some(size) = args.batch_size {
        config.output.batch_size = size;
    }
    if let Some(ref level) = args.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Split `topic<TAB>payload`. Without a tab the whole line is the topic.
fn split_message(line: &str) -> (&str, &str) {
    line.split_once('\t').unwrap_or((line, ""))
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn write_batch(out: &mut impl Write, batch: &[String]) -> io::Result<()> {
    for line in batch {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn log_stats(stats: &WriteStatsSnapshot) {
    tracing::info!(
        "Points: {} total, {} in interval, max {} pending, {} failed ({:.1} pt/s)",
        stats.total,
        stats.interval,
        stats.max_concurrent,
        stats.failed,
        stats.points_per_second()
    );
}

fn cmd_gen_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = BridgeConfig {
        name: "example-bridge".into(),
        ..Default::default()
    };
    config.parser.mode = PayloadMode::MapFields;
    config.parser.numeric_parser_mode = NumericMode::Strict;

    let content = format!(
        r#"# MQTT to InfluxDB bridge configuration
# Generated by mqtt-influx gen-config
#
# parser.mode: static | auto | mapFields
# parser.numeric_parser_mode: strict | tolerant | eager

{}
"#,
        config.to_toml()?
    );

    std::fs::write(&output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match BridgeConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!("Bridge: {}", config.name);
            println!("Mode: {}", config.parser.mode);
            println!("Numeric parser: {}", config.parser.numeric_parser_mode);
            println!(
                "Batch: {} lines / {} ms",
                config.output.batch_size, config.output.flush_interval_ms
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mqtt_influx::ParserError;

    #[test]
    fn test_split_message() {
        assert_eq!(split_message("a/b\t12.5"), ("a/b", "12.5"));
        assert_eq!(split_message("a/b\t{\"k\":\"x\ty\"}"), ("a/b", "{\"k\":\"x\ty\"}"));
        assert_eq!(split_message("a/b"), ("a/b", ""));
    }

    #[test]
    fn test_build_config_overrides() {
        let args = Args::parse_from([
            "mqtt-influx",
            "--mode",
            "static",
            "--static-field",
            "raw",
            "--batch-size",
            "10",
        ]);
        let config = build_config(&args).expect("config");
        assert_eq!(config.parser.mode, PayloadMode::Static);
        assert_eq!(config.parser.static_field, "raw");
        assert_eq!(config.output.batch_size, 10);
    }

    #[test]
    fn test_build_config_rejects_unknown_numeric_mode() {
        let args = Args::parse_from(["mqtt-influx", "--numeric-parser-mode", "fuzzy"]);
        assert!(matches!(
            build_config(&args),
            Err(ConfigError::Parser(ParserError::UnknownNumericMode(_)))
        ));
    }
}
