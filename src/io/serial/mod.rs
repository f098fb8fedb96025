// src/io/serial/mod.rs
//
// Hardware backend over the serialport crate.
//
// - `SystemPorts` lists the devices the OS currently exposes
// - `SerialOpener` opens a device and starts a byte-arrival watcher thread
//   that signals the owning context through a `LinkEvent` channel

mod port;
pub(crate) mod utils;

pub use port::{SerialOpener, SystemPorts};
