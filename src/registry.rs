// src/registry.rs
//
// Port list with selection that survives rescans.
//
// The list is rebuilt wholesale on every rescan, whether the user asked for
// it or the hot-plug watcher did. The selection follows the device id, not
// the index. When the device behind the open link vanishes, a placeholder
// entry keeps it visible and selected until the link is closed.

use std::sync::Arc;

use crate::io::{PortDescriptor, PortEnumerator};

pub struct PortRegistry {
    enumerator: Arc<dyn PortEnumerator>,
    ports: Vec<PortDescriptor>,
    selected: Option<usize>,
}

impl PortRegistry {
    pub fn new(enumerator: Arc<dyn PortEnumerator>) -> Self {
        Self {
            enumerator,
            ports: Vec::new(),
            selected: None,
        }
    }

    /// Re-query the OS and rebuild the list.
    ///
    /// `open_port` is the id the session currently has open, if any.
    pub fn rescan(&mut self, open_port: Option<&str>) -> &[PortDescriptor] {
        let ids = match self.enumerator.port_ids() {
            Ok(ids) => ids,
            Err(e) => {
                tlog!("[registry] {}", e);
                Vec::new()
            }
        };

        let previous = self.selected().map(|d| d.id.clone());
        let (ports, selected) = reconcile(ids, previous.as_deref(), open_port);

        tlog!(
            "[registry] {} port(s), selected {:?}",
            ports.len(),
            selected.map(|i| &ports[i].label)
        );

        self.ports = ports;
        self.selected = selected;
        &self.ports
    }

    pub fn ports(&self) -> &[PortDescriptor] {
        &self.ports
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&PortDescriptor> {
        self.selected.and_then(|i| self.ports.get(i))
    }

    /// Select by list position. Out-of-range indices leave the selection alone.
    pub fn select(&mut self, index: usize) -> Option<&PortDescriptor> {
        if index < self.ports.len() {
            self.selected = Some(index);
        }
        self.ports.get(index)
    }

    /// Select by device id.
    pub fn select_id(&mut self, id: &str) -> Option<&PortDescriptor> {
        let index = self.ports.iter().position(|d| d.id == id)?;
        self.select(index)
    }
}

/// Build the descriptor list for `ids` and work out which entry is selected.
///
/// - previous selection still present: it stays selected (found by id)
/// - previous selection gone but it is the open link: a disconnected
///   placeholder is appended and selected
/// - otherwise the first entry, if any
pub fn reconcile(
    ids: Vec<String>,
    previous: Option<&str>,
    open_port: Option<&str>,
) -> (Vec<PortDescriptor>, Option<usize>) {
    let mut ports: Vec<PortDescriptor> = ids.into_iter().map(PortDescriptor::present).collect();

    let mut selected = previous.and_then(|prev| ports.iter().position(|d| d.id == prev));

    if selected.is_none() {
        if let (Some(prev), Some(open)) = (previous, open_port) {
            if prev == open {
                ports.push(PortDescriptor::disconnected(prev));
                selected = Some(ports.len() - 1);
            }
        }
    }

    if selected.is_none() && !ports.is_empty() {
        selected = Some(0);
    }

    (ports, selected)
}

// ============================================================================
// Tests
// ============================================================================
