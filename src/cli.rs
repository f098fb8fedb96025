// src/cli.rs
//
// Command-line arguments. Anything given here overrides settings.json for
// the current run only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::codec::CodecMode;
use crate::io::{Parity, StopBits};
use crate::settings::AppSettings;

#[derive(Parser, Debug)]
#[command(name = "serial-debug")]
#[command(about = "Interactive serial port debugging console", version)]
pub struct Cli {
    /// Echo log lines to stderr while the console is running
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to use instead of the platform default
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the serial ports currently present
    List,
    /// Start the interactive console (the default)
    Open(OpenArgs),
}

#[derive(Args, Debug, Default, Clone, PartialEq)]
pub struct OpenArgs {
    /// Port to open on start, e.g. COM3 or /dev/ttyUSB0
    pub port: Option<String>,

    /// Baud rate; any positive integer is accepted
    #[arg(short, long)]
    pub baud: Option<String>,

    /// none, odd, even, mark or space
    #[arg(short, long)]
    pub parity: Option<Parity>,

    /// 5, 6, 7 or 8
    #[arg(short, long)]
    pub data_bits: Option<u8>,

    /// 1, 1.5 or 2
    #[arg(short, long)]
    pub stop_bits: Option<StopBits>,

    /// How received bytes are shown: text, hex or escape
    #[arg(long, value_name = "MODE")]
    pub rx: Option<CodecMode>,

    /// How typed lines are turned into bytes: text, hex or escape
    #[arg(long, value_name = "MODE")]
    pub tx: Option<CodecMode>,
}

impl OpenArgs {
    /// Fold command-line overrides into the loaded settings.
    /// A non-numeric baud is kept for the console to report on open.
    pub fn apply_to(&self, settings: &mut AppSettings) -> Option<String> {
        if let Some(parity) = self.parity {
            settings.parity = parity;
        }
        if let Some(bits) = self.data_bits {
            settings.data_bits = bits;
        }
        if let Some(stop_bits) = self.stop_bits {
            settings.stop_bits = stop_bits;
        }
        if let Some(mode) = self.rx {
            settings.rx_mode = mode;
        }
        if let Some(mode) = self.tx {
            settings.tx_mode = mode;
        }

        let baud = self.baud.as_ref()?;
        match baud.trim().parse::<u32>() {
            Ok(value) => {
                settings.baud_rate = value;
                None
            }
            Err(_) => Some(baud.clone()),
        }
    }
}
