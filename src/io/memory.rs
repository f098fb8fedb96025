// src/io/memory.rs
//
// In-memory backend for tests. Devices are plain names; an opened port reads
// from a shared receive queue and records everything written to it.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use super::{LineConfig, LinkError, LinkPort, LinkTicket, PortEnumerator, PortOpener};

#[derive(Default)]
struct Shared {
    devices: Vec<String>,
    rx: VecDeque<u8>,
    written: Vec<Vec<u8>>,
    opened: Vec<(String, LineConfig, LinkTicket)>,
    open_handles: usize,
    fail_open: Option<String>,
    fail_write: Option<io::ErrorKind>,
    fail_read: Option<io::ErrorKind>,
}

/// Handle to the simulated machine. Cheap to clone; all clones share state.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryBackend {
    pub fn with_devices(devices: &[&str]) -> Self {
        let backend = Self::default();
        backend.set_devices(devices);
        backend
    }

    pub fn set_devices(&self, devices: &[&str]) {
        self.shared.lock().unwrap().devices = devices.iter().map(|d| d.to_string()).collect();
    }

    pub fn inject_rx(&self, bytes: &[u8]) {
        self.shared.lock().unwrap().rx.extend(bytes);
    }

    pub fn written(&self) -> Vec<Vec<u8>> {
        self.shared.lock().unwrap().written.clone()
    }

    pub fn opened(&self) -> Vec<(String, LineConfig, LinkTicket)> {
        self.shared.lock().unwrap().opened.clone()
    }

    pub fn open_handles(&self) -> usize {
        self.shared.lock().unwrap().open_handles
    }

    pub fn fail_next_open(&self, detail: &str) {
        self.shared.lock().unwrap().fail_open = Some(detail.to_string());
    }

    pub fn fail_writes(&self, kind: io::ErrorKind) {
        self.shared.lock().unwrap().fail_write = Some(kind);
    }

    pub fn fail_reads(&self, kind: io::ErrorKind) {
        self.shared.lock().unwrap().fail_read = Some(kind);
    }
}

impl PortEnumerator for MemoryBackend {
    fn port_ids(&self) -> Result<Vec<String>, LinkError> {
        Ok(self.shared.lock().unwrap().devices.clone())
    }
}

impl PortOpener for MemoryBackend {
    fn open(
        &self,
        port_id: &str,
        config: &LineConfig,
        ticket: LinkTicket,
    ) -> Result<Box<dyn LinkPort>, LinkError> {
        let mut shared = self.shared.lock().unwrap();
        if let Some(detail) = shared.fail_open.take() {
            return Err(LinkError::open(port_id, detail));
        }
        if !shared.devices.iter().any(|d| d == port_id) {
            return Err(LinkError::open(port_id, "No such file or directory"));
        }
        if shared.open_handles > 0 {
            return Err(LinkError::open(port_id, "Device or resource busy"));
        }
        shared.open_handles += 1;
        shared.opened.push((port_id.to_string(), config.clone(), ticket));
        Ok(Box::new(MemoryPort {
            shared: self.shared.clone(),
            closed: false,
        }))
    }
}

struct MemoryPort {
    shared: Arc<Mutex<Shared>>,
    closed: bool,
}

impl LinkPort for MemoryPort {
    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let mut shared = self.shared.lock().unwrap();
        if let Some(kind) = shared.fail_read {
            return Err(io::Error::new(kind, "simulated read failure"));
        }
        Ok(shared.rx.drain(..).collect())
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut shared = self.shared.lock().unwrap();
        if let Some(kind) = shared.fail_write {
            return Err(io::Error::new(kind, "simulated write failure"));
        }
        shared.written.push(bytes.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.shared.lock().unwrap().open_handles -= 1;
        }
    }
}

impl Drop for MemoryPort {
    fn drop(&mut self) {
        self.close();
    }
}
