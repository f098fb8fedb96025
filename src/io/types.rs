// src/io/types.rs
//
// Line configuration, port descriptors and the signals a backend raises.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::LinkError;
use crate::presets;

// ============================================================================
// Line Parameters
// ============================================================================

/// Parity setting for serial port configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl Parity {
    /// Letter used in `8N1`-style summaries
    pub fn letter(&self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
            Parity::Mark => 'M',
            Parity::Space => 'S',
        }
    }
}

impl FromStr for Parity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "n" => Ok(Parity::None),
            "odd" | "o" => Ok(Parity::Odd),
            "even" | "e" => Ok(Parity::Even),
            "mark" | "m" => Ok(Parity::Mark),
            "space" | "s" => Ok(Parity::Space),
            other => Err(format!("Unknown parity '{}'", other)),
        }
    }
}

/// Stop bits setting for serial port configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBits {
    #[default]
    One,
    OnePointFive,
    Two,
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopBits::One => "1",
            StopBits::OnePointFive => "1.5",
            StopBits::Two => "2",
        })
    }
}

impl FromStr for StopBits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "one" => Ok(StopBits::One),
            "1.5" | "one_point_five" => Ok(StopBits::OnePointFive),
            "2" | "two" => Ok(StopBits::Two),
            other => Err(format!("Unknown stop bits '{}'", other)),
        }
    }
}

/// Baud rate as chosen by the user: a preset, or free text typed into the box
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BaudRate {
    Preset(u32),
    Custom(String),
}

impl BaudRate {
    /// Classify typed text. Known preset values become `Preset`.
    pub fn from_text(text: &str) -> Self {
        match text.trim().parse::<u32>() {
            Ok(value) if presets::BAUD_RATES.contains(&value) => BaudRate::Preset(value),
            _ => BaudRate::Custom(text.to_string()),
        }
    }

    pub fn value(&self) -> Result<u32, LinkError> {
        let value = match self {
            BaudRate::Preset(value) => Some(*value),
            BaudRate::Custom(text) => text.trim().parse::<u32>().ok(),
        };
        match value {
            Some(v) if v > 0 => Ok(v),
            _ => Err(LinkError::configuration(format!(
                "'{}' is not a valid baud rate",
                self
            ))),
        }
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        BaudRate::Preset(presets::DEFAULT_BAUD_RATE)
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaudRate::Preset(value) => write!(f, "{}", value),
            BaudRate::Custom(text) => f.write_str(text.trim()),
        }
    }
}

/// The front end's current selections. Resolved into a `LineConfig` on open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineChoices {
    pub baud: BaudRate,
    pub parity: Parity,
    pub data_bits: u8,
    pub stop_bits: StopBits,
}

impl Default for LineChoices {
    fn default() -> Self {
        Self {
            baud: BaudRate::default(),
            parity: Parity::default(),
            data_bits: presets::DEFAULT_DATA_BITS,
            stop_bits: StopBits::default(),
        }
    }
}

impl LineChoices {
    pub fn resolve(&self) -> Result<LineConfig, LinkError> {
        let baud_rate = self.baud.value()?;
        if !presets::DATA_BITS.contains(&self.data_bits) {
            return Err(LinkError::configuration(format!(
                "data bits must be 5-8, got {}",
                self.data_bits
            )));
        }
        Ok(LineConfig {
            baud_rate,
            parity: self.parity,
            data_bits: self.data_bits,
            stop_bits: self.stop_bits,
        })
    }
}

/// Validated line parameters attached to an open handle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineConfig {
    pub baud_rate: u32,
    pub parity: Parity,
    pub data_bits: u8,
    pub stop_bits: StopBits,
}

impl fmt::Display for LineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{}{}",
            self.baud_rate,
            self.data_bits,
            self.parity.letter(),
            self.stop_bits
        )
    }
}

// ============================================================================
// Ports
// ============================================================================

/// One entry of the port list
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PortDescriptor {
    /// Device identifier passed to the opener (COM3, /dev/ttyUSB0)
    pub id: String,
    pub label: String,
    /// false only for the placeholder of a vanished, still-open device
    pub connected: bool,
}

impl PortDescriptor {
    pub fn present(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            connected: true,
        }
    }

    pub fn disconnected(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: format!("{} (disconnected)", id),
            id,
            connected: false,
        }
    }
}

// ============================================================================
// Backend Signals
// ============================================================================

/// Identifies one open handle. A new ticket is issued for every open, so
/// signals from a closed handle can be told apart from the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LinkTicket(pub u64);

impl fmt::Display for LinkTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Signal raised by a backend from its own thread
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    /// Bytes are waiting to be pulled from the handle
    BytesAvailable(LinkTicket),
    /// The handle failed underneath us (device unplugged, driver error)
    Fault(LinkTicket, String),
}

impl LinkEvent {
    pub fn ticket(&self) -> LinkTicket {
        match self {
            LinkEvent::BytesAvailable(ticket) | LinkEvent::Fault(ticket, _) => *ticket,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_default() {
        assert_eq!(Parity::default(), Parity::None);
    }

    #[test]
    fn test_parity_and_stop_bits_from_str() {
        assert_eq!("Mark".parse::<Parity>().unwrap(), Parity::Mark);
        assert_eq!("e".parse::<Parity>().unwrap(), Parity::Even);
        assert!("sideways".parse::<Parity>().is_err());
        assert_eq!("1.5".parse::<StopBits>().unwrap(), StopBits::OnePointFive);
        assert_eq!("two".parse::<StopBits>().unwrap(), StopBits::Two);
        assert!("3".parse::<StopBits>().is_err());
    }

    #[test]
    fn test_baud_from_text() {
        assert_eq!(BaudRate::from_text("115200"), BaudRate::Preset(115200));
        assert_eq!(BaudRate::from_text("250000"), BaudRate::Custom("250000".into()));
        assert_eq!(BaudRate::from_text("fast"), BaudRate::Custom("fast".into()));
    }

    #[test]
    fn test_custom_baud_value() {
        assert_eq!(BaudRate::Custom(" 250000 ".into()).value().unwrap(), 250000);
        assert!(matches!(
            BaudRate::Custom("96OO".into()).value(),
            Err(LinkError::Configuration(_))
        ));
        assert!(BaudRate::Custom("0".into()).value().is_err());
        assert!(BaudRate::Custom("-9600".into()).value().is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let config = LineChoices::default().resolve().unwrap();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.to_string(), "9600 8N1");
    }

    #[test]
    fn test_resolve_rejects_data_bits() {
        let choices = LineChoices {
            data_bits: 9,
            ..LineChoices::default()
        };
        assert!(matches!(choices.resolve(), Err(LinkError::Configuration(_))));
    }

    #[test]
    fn test_line_config_summary() {
        let config = LineChoices {
            baud: BaudRate::Preset(115200),
            parity: Parity::Even,
            data_bits: 7,
            stop_bits: StopBits::OnePointFive,
        }
        .resolve()
        .unwrap();
        assert_eq!(config.to_string(), "115200 7E1.5");
    }

    #[test]
    fn test_descriptors() {
        let live = PortDescriptor::present("COM3");
        assert_eq!(live.label, "COM3");
        assert!(live.connected);

        let gone = PortDescriptor::disconnected("COM3");
        assert_eq!(gone.id, "COM3");
        assert_eq!(gone.label, "COM3 (disconnected)");
        assert!(!gone.connected);
    }

    #[test]
    fn test_event_ticket() {
        assert_eq!(LinkEvent::BytesAvailable(LinkTicket(4)).ticket(), LinkTicket(4));
        assert_eq!(LinkEvent::Fault(LinkTicket(2), "gone".into()).ticket(), LinkTicket(2));
    }
}
