// src/io/mod.rs
//
// Boundary between the link core and the platform.
//
// The core (registry, session) only talks to the three traits below. The
// `serial` module implements them over the serialport crate; tests use the
// in-memory backend in `memory`.

mod error;
pub mod hotplug;
#[cfg(test)]
pub(crate) mod memory;
pub mod serial;
mod types;

pub use error::LinkError;
pub use hotplug::{HotplugWatcher, Rescan};
pub use types::{
    BaudRate, LineChoices, LineConfig, LinkEvent, LinkTicket, Parity, PortDescriptor, StopBits,
};

// ============================================================================
// Boundary Traits
// ============================================================================

/// Lists the serial device identifiers currently present.
pub trait PortEnumerator: Send + Sync {
    fn port_ids(&self) -> Result<Vec<String>, LinkError>;
}

/// Opens and configures a hardware handle.
///
/// The backend raises `LinkEvent`s tagged with `ticket` from its own threads
/// once the handle is open.
pub trait PortOpener {
    fn open(
        &self,
        port_id: &str,
        config: &LineConfig,
        ticket: LinkTicket,
    ) -> Result<Box<dyn LinkPort>, LinkError>;
}

/// An open hardware handle.
pub trait LinkPort: Send {
    /// Pull everything currently buffered by the driver. Never blocks waiting
    /// for more.
    fn read_available(&mut self) -> std::io::Result<Vec<u8>>;

    fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Stop signalling. Dropping the handle releases the device.
    fn close(&mut self);
}
