//! Core application runner (business logic) for `ruuvitag-scanner`.
//!
//! This module is intentionally decoupled from CLI parsing and process exit
//! codes so it can be tested deterministically with an injected radio and
//! injected output streams.

use crate::classifier::AddressClassifier;
use crate::mac_address::MacAddress;
use crate::output::OutputFormatter;
use crate::output::influxdb::InfluxDbFormatter;
use crate::output::text::TextFormatter;
use crate::radio::{Radio, RadioError};
use crate::session::{DeliveryPolicy, ScanSession, TrackSession};
use clap::{Parser, ValueEnum};
use std::fmt;
use std::io;
use std::io::Write;
use std::ops::ControlFlow;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Operating mode of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Repeated bounded scan windows, one reading per tag per window.
    #[default]
    Scan,
    /// Continuous tracking, one reading per received advertisement.
    Track,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Scan => write!(f, "scan"),
            Mode::Track => write!(f, "track"),
        }
    }
}

/// Output format for readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputKind {
    /// One human-readable line per reading.
    #[default]
    Text,
    /// InfluxDB line protocol.
    Influxdb,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Text => write!(f, "text"),
            OutputKind::Influxdb => write!(f, "influxdb"),
        }
    }
}

/// Configuration for the core run loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Operating mode.
    #[arg(long, default_value_t, value_enum)]
    pub mode: Mode,

    /// Only process these tag addresses (repeatable).
    /// Example: --allow DE:AD:BE:EF:00:00
    #[arg(long = "allow", value_name = "MAC")]
    pub allow: Vec<MacAddress>,

    /// Length of one scan window.
    /// Accepts duration with suffix: 10s, 1m, 500ms.
    #[arg(long, value_parser = crate::duration::parse_duration, default_value = "10s")]
    pub window: Duration,

    /// Pause between scan windows.
    #[arg(long, value_parser = crate::duration::parse_duration, default_value = "30s")]
    pub interval: Duration,

    /// In track mode, deliver only raw (format 3/5) readings.
    #[arg(long)]
    pub raw_only: bool,

    /// Output format for readings.
    #[arg(long, default_value_t, value_enum)]
    pub output: OutputKind,

    /// The name of the measurement in InfluxDB line protocol output.
    #[arg(long, default_value = "ruuvi_measurement")]
    pub influxdb_measurement: String,

    /// Verbose output, print per-window summaries to stderr.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Radio(#[from] RadioError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn make_formatter(options: &Options) -> Box<dyn OutputFormatter> {
    match options.output {
        OutputKind::Text => Box::new(TextFormatter),
        OutputKind::Influxdb => Box::new(InfluxDbFormatter::new(
            options.influxdb_measurement.clone(),
        )),
    }
}

fn make_classifier(options: &Options) -> AddressClassifier {
    if options.allow.is_empty() {
        AddressClassifier::new()
    } else {
        AddressClassifier::with_allow_list(options.allow.iter().copied())
    }
}

/// Run the core processing loop, writing formatted readings to `out` and
/// verbose diagnostics to `err`.
///
/// In scan mode, windows of `options.window` are processed back to back with
/// `options.interval` pauses, reusing one classifier so denied addresses stay
/// denied across windows. In track mode every admitted advertisement is
/// decoded and written immediately. Both modes return once the radio's
/// advertisement stream ends.
pub async fn run_with_io(
    options: Options,
    radio: &dyn Radio,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), RunError> {
    let formatter = make_formatter(&options);
    let mut classifier = make_classifier(&options);

    let mut adverts = radio.start_capture().await?;

    match options.mode {
        Mode::Track => {
            let policy = if options.raw_only {
                DeliveryPolicy::RawOnly
            } else {
                DeliveryPolicy::All
            };

            // A failed write ends the session right away; with a real radio
            // the stream never closes on its own.
            let mut write_error = None;
            TrackSession::with_policy(&mut classifier, policy)
                .run(&mut adverts, |reading| {
                    match writeln!(out, "{}", formatter.format(&reading)) {
                        Ok(()) => ControlFlow::Continue(()),
                        Err(e) => {
                            write_error = Some(e);
                            ControlFlow::Break(())
                        }
                    }
                })
                .await;

            if let Some(e) = write_error {
                return Err(e.into());
            }
        }
        Mode::Scan => loop {
            let readings = ScanSession::new(&mut classifier)
                .run(&mut adverts, options.window)
                .await;

            if options.verbose {
                writeln!(
                    err,
                    "found {} RuuviTags ({} addresses denied)",
                    readings.len(),
                    classifier.denied().len()
                )?;
            }
            for reading in &readings {
                writeln!(out, "{}", formatter.format(reading))?;
            }

            if adverts.is_closed() && adverts.is_empty() {
                break;
            }
            sleep(options.interval).await;
        },
    }

    Ok(())
}
