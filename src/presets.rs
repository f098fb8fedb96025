// src/presets.rs
//
// Selectable line parameter values offered to the user, with their defaults.

use crate::io::{Parity, StopBits};

pub const BAUD_RATES: [u32; 18] = [
    300, 600, 1200, 1800, 2400, 3600, 4800, 7200, 9600, 14400, 19200, 28800, 38400, 57600,
    115200, 921600, 1000000, 2000000,
];

pub const DEFAULT_BAUD_RATE: u32 = 9600;

pub const PARITIES: [(Parity, &str); 5] = [
    (Parity::None, "None"),
    (Parity::Odd, "Odd"),
    (Parity::Even, "Even"),
    (Parity::Mark, "Mark (1)"),
    (Parity::Space, "Space (0)"),
];

pub const DATA_BITS: [u8; 4] = [5, 6, 7, 8];

pub const DEFAULT_DATA_BITS: u8 = 8;

pub const STOP_BITS: [(StopBits, &str); 3] = [
    (StopBits::One, "1 bit"),
    (StopBits::OnePointFive, "1.5 bits"),
    (StopBits::Two, "2 bits"),
];

/// Display name for a parity value
pub fn parity_name(parity: Parity) -> &'static str {
    PARITIES
        .iter()
        .find(|(p, _)| *p == parity)
        .map(|(_, name)| *name)
        .unwrap_or("None")
}

/// Display name for a stop bits value
pub fn stop_bits_name(stop_bits: StopBits) -> &'static str {
    STOP_BITS
        .iter()
        .find(|(s, _)| *s == stop_bits)
        .map(|(_, name)| *name)
        .unwrap_or("1 bit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_offered() {
        assert!(BAUD_RATES.contains(&DEFAULT_BAUD_RATE));
        assert!(DATA_BITS.contains(&DEFAULT_DATA_BITS));
        assert_eq!(BAUD_RATES.iter().position(|b| *b == DEFAULT_BAUD_RATE), Some(8));
    }

    #[test]
    fn test_baud_rates_ascending() {
        assert!(BAUD_RATES.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_names() {
        assert_eq!(parity_name(Parity::Mark), "Mark (1)");
        assert_eq!(stop_bits_name(StopBits::OnePointFive), "1.5 bits");
    }
}
