// src/io/serial/utils.rs
//
// Conversions from our line parameters to the serialport crate's types.
// serialport has no mark/space parity and no 1.5 stop bits; those are
// reported as configuration errors rather than silently substituted.

use serialport::{DataBits, Parity as SpParity, StopBits as SpStopBits};

use crate::io::{LinkError, Parity, StopBits};

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert our Parity enum to serialport crate's Parity type
pub fn to_serialport_parity(p: Parity) -> Result<SpParity, LinkError> {
    match p {
        Parity::None => Ok(SpParity::None),
        Parity::Odd => Ok(SpParity::Odd),
        Parity::Even => Ok(SpParity::Even),
        Parity::Mark | Parity::Space => Err(LinkError::configuration(format!(
            "{:?} parity is not supported on this platform",
            p
        ))),
    }
}

/// Convert data bits count to serialport crate's DataBits type
pub fn to_serialport_data_bits(bits: u8) -> Result<DataBits, LinkError> {
    match bits {
        5 => Ok(DataBits::Five),
        6 => Ok(DataBits::Six),
        7 => Ok(DataBits::Seven),
        8 => Ok(DataBits::Eight),
        other => Err(LinkError::configuration(format!(
            "data bits must be 5-8, got {}",
            other
        ))),
    }
}

/// Convert our StopBits enum to serialport crate's StopBits type
pub fn to_serialport_stop_bits(bits: StopBits) -> Result<SpStopBits, LinkError> {
    match bits {
        StopBits::One => Ok(SpStopBits::One),
        StopBits::Two => Ok(SpStopBits::Two),
        StopBits::OnePointFive => Err(LinkError::configuration(
            "1.5 stop bits are not supported on this platform",
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_serialport_parity() {
        assert!(matches!(to_serialport_parity(Parity::None), Ok(SpParity::None)));
        assert!(matches!(to_serialport_parity(Parity::Odd), Ok(SpParity::Odd)));
        assert!(matches!(to_serialport_parity(Parity::Even), Ok(SpParity::Even)));
        assert!(matches!(
            to_serialport_parity(Parity::Mark),
            Err(LinkError::Configuration(_))
        ));
        assert!(to_serialport_parity(Parity::Space).is_err());
    }

    #[test]
    fn test_to_serialport_data_bits() {
        assert!(matches!(to_serialport_data_bits(5), Ok(DataBits::Five)));
        assert!(matches!(to_serialport_data_bits(6), Ok(DataBits::Six)));
        assert!(matches!(to_serialport_data_bits(7), Ok(DataBits::Seven)));
        assert!(matches!(to_serialport_data_bits(8), Ok(DataBits::Eight)));
        assert!(to_serialport_data_bits(9).is_err());
    }

    #[test]
    fn test_to_serialport_stop_bits() {
        assert!(matches!(to_serialport_stop_bits(StopBits::One), Ok(SpStopBits::One)));
        assert!(matches!(to_serialport_stop_bits(StopBits::Two), Ok(SpStopBits::Two)));
        assert!(to_serialport_stop_bits(StopBits::OnePointFive).is_err());
    }
}
