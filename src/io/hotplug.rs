// src/io/hotplug.rs
//
// Device arrival/removal watcher.
//
// Polls the enumerator on a fixed interval and posts a unit `Rescan` into the
// owning context whenever the set of device ids changes. The watcher never
// touches the registry itself.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::PortEnumerator;

/// "The device list changed, recompute it"
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rescan;

pub struct HotplugWatcher {
    task: Option<JoinHandle<()>>,
}

impl HotplugWatcher {
    /// Start watching. Must be called from within a tokio runtime.
    pub fn spawn(
        enumerator: Arc<dyn PortEnumerator>,
        interval: Duration,
        tx: mpsc::UnboundedSender<Rescan>,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut known = snapshot(enumerator.as_ref()).unwrap_or_default();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let Some(current) = snapshot(enumerator.as_ref()) else {
                    continue;
                };
                if current == known {
                    continue;
                }

                tlog!(
                    "[hotplug] Device set changed: {} -> {} port(s)",
                    known.len(),
                    current.len()
                );
                known = current;
                if tx.send(Rescan).is_err() {
                    // Owning context is gone
                    break;
                }
            }
        });

        Self { task: Some(task) }
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for HotplugWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn snapshot(enumerator: &dyn PortEnumerator) -> Option<BTreeSet<String>> {
    match enumerator.port_ids() {
        Ok(ids) => Some(ids.into_iter().collect()),
        Err(e) => {
            tlog!("[hotplug] {}", e);
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
