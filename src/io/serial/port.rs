// src/io/serial/port.rs
//
// serialport-backed enumerator, opener and handle.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use serialport::SerialPort;
use tokio::sync::mpsc;

use super::utils;
use crate::io::{
    LineConfig, LinkError, LinkEvent, LinkPort, LinkTicket, PortEnumerator, PortOpener,
};

/// Read timeout on the handle. Reads only ever ask for bytes already
/// buffered, so this only bounds a read racing a device removal.
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Default poll period of the byte-arrival watcher
const DEFAULT_ARRIVAL_POLL: Duration = Duration::from_millis(5);

// ============================================================================
// Enumeration
// ============================================================================

/// The OS's list of serial devices
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemPorts;

impl PortEnumerator for SystemPorts {
    /// On macOS, filters out /dev/tty.* devices and only shows /dev/cu.* devices.
    /// The cu (calling unit) devices are non-blocking and preferred for outgoing connections.
    /// The tty (terminal) devices block on open waiting for carrier detect.
    fn port_ids(&self) -> Result<Vec<String>, LinkError> {
        let ports =
            serialport::available_ports().map_err(|e| LinkError::Enumerate(e.to_string()))?;

        Ok(ports
            .into_iter()
            .map(|p| p.port_name)
            .filter(|_name| {
                #[cfg(target_os = "macos")]
                {
                    !_name.starts_with("/dev/tty.")
                }
                #[cfg(not(target_os = "macos"))]
                {
                    true
                }
            })
            .collect())
    }
}

// ============================================================================
// Opening
// ============================================================================

/// Opens devices and wires their byte-arrival signal into `events`
#[derive(Clone)]
pub struct SerialOpener {
    events: mpsc::UnboundedSender<LinkEvent>,
    poll: Duration,
}

impl SerialOpener {
    pub fn new(events: mpsc::UnboundedSender<LinkEvent>) -> Self {
        Self {
            events,
            poll: DEFAULT_ARRIVAL_POLL,
        }
    }
}

impl PortOpener for SerialOpener {
    fn open(
        &self,
        port_id: &str,
        config: &LineConfig,
        ticket: LinkTicket,
    ) -> Result<Box<dyn LinkPort>, LinkError> {
        let data_bits = utils::to_serialport_data_bits(config.data_bits)?;
        let stop_bits = utils::to_serialport_stop_bits(config.stop_bits)?;
        let parity = utils::to_serialport_parity(config.parity)?;

        let port = serialport::new(port_id, config.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| LinkError::open(port_id, e.to_string()))?;

        // Second handle on the same device, used only to poll the input queue
        let probe = port
            .try_clone()
            .map_err(|e| LinkError::open(port_id, e.to_string()))?;

        let closed = Arc::new(AtomicBool::new(false));
        let gate = ArrivalGate::default();
        spawn_arrival_watcher(
            port_id,
            probe,
            ticket,
            closed.clone(),
            gate.clone(),
            self.events.clone(),
            self.poll,
        )?;

        tlog!("[serial] Opened {} at {} (link {})", port_id, config, ticket);

        Ok(Box::new(SerialLink {
            port_id: port_id.to_string(),
            port,
            closed,
            gate,
        }))
    }
}

/// Keeps at most one `BytesAvailable` in flight per handle. The watcher arms
/// it when it signals; the handle clears it before each read.
#[derive(Clone, Default)]
struct ArrivalGate {
    pending: Arc<AtomicBool>,
}

impl ArrivalGate {
    /// Whether `buffered` unread bytes warrant a new signal
    fn should_signal(&self, buffered: u32) -> bool {
        buffered > 0 && !self.pending.swap(true, Ordering::AcqRel)
    }

    fn acknowledge(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

/// Background thread raising `BytesAvailable` when the driver holds unread
/// input. Exits once the handle is closed, the device faults or the owning
/// context goes away.
fn spawn_arrival_watcher(
    port_id: &str,
    probe: Box<dyn SerialPort>,
    ticket: LinkTicket,
    closed: Arc<AtomicBool>,
    gate: ArrivalGate,
    events: mpsc::UnboundedSender<LinkEvent>,
    poll: Duration,
) -> Result<(), LinkError> {
    std::thread::Builder::new()
        .name(format!("serial-rx-{}", ticket.0))
        .spawn(move || {
            while !closed.load(Ordering::Relaxed) {
                match probe.bytes_to_read() {
                    Ok(buffered) => {
                        if gate.should_signal(buffered)
                            && events.send(LinkEvent::BytesAvailable(ticket)).is_err()
                        {
                            return;
                        }
                    }
                    Err(e) => {
                        // After close this is the handle going away under us
                        if !closed.load(Ordering::Relaxed) {
                            let _ = events.send(LinkEvent::Fault(ticket, e.to_string()));
                        }
                        return;
                    }
                }
                std::thread::sleep(poll);
            }
        })
        .map(|_| ())
        .map_err(|e| LinkError::open(port_id, format!("failed to start reader: {}", e)))
}

// ============================================================================
// Handle
// ============================================================================

struct SerialLink {
    port_id: String,
    port: Box<dyn SerialPort>,
    closed: Arc<AtomicBool>,
    gate: ArrivalGate,
}

impl LinkPort for SerialLink {
    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        // Bytes arriving after this point raise a fresh signal
        self.gate.acknowledge();
        let pending = self.port.bytes_to_read().map_err(io::Error::from)? as usize;
        if pending == 0 {
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; pending];
        let mut filled = 0;
        while filled < pending {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn close(&mut self) {
        if !self.closed.swap(true, Ordering::Relaxed) {
            tlog!("[serial] Closed {}", self.port_id);
        }
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// Tests
// ============================================================================
