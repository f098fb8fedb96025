// src/session.rs
//
// The single active serial link.
//
// LinkSession owns at most one hardware handle and is only ever touched by
// the owning context. Nothing here returns an error to the caller: failures
// are logged and turned into one notification.
//
// A backend fault (device unplugged) does not close the link. The handle
// stops signalling and the link is marked lost, so the registry can still
// show the vanished device as the open one until the user closes it. A read
// error on a live handle is unrecoverable and forces the link Closed.

use crate::codec::{self, CodecMode};
use crate::io::{LineChoices, LineConfig, LinkError, LinkEvent, LinkPort, LinkTicket, PortOpener};
use crate::notify::Notifier;

/// Shown when sending with no open link
pub const NOT_OPEN_MESSAGE: &str = "Port not open";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Closed,
    Open,
}

/// What a `send` call did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing written; the user was told the link is closed
    NotOpen,
    /// `bytes` were handed to the driver. `canonical` is the normalised input
    /// text in Hex mode, to be written back into the input field.
    Written {
        bytes: usize,
        canonical: Option<String>,
    },
    /// The write failed and the bytes are lost
    Failed { canonical: Option<String> },
}

struct ActiveLink {
    handle: Box<dyn LinkPort>,
    port_id: String,
    config: LineConfig,
    ticket: LinkTicket,
    lost: bool,
}

pub struct LinkSession {
    opener: Box<dyn PortOpener>,
    active: Option<ActiveLink>,
    next_ticket: u64,
    rx_mode: CodecMode,
    tx_mode: CodecMode,
}

impl LinkSession {
    pub fn new(opener: Box<dyn PortOpener>) -> Self {
        Self {
            opener,
            active: None,
            next_ticket: 1,
            rx_mode: CodecMode::default(),
            tx_mode: CodecMode::default(),
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn state(&self) -> LinkState {
        if self.active.is_some() {
            LinkState::Open
        } else {
            LinkState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Device id of the open link
    pub fn port_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.port_id.as_str())
    }

    pub fn config(&self) -> Option<&LineConfig> {
        self.active.as_ref().map(|a| &a.config)
    }

    /// The backend reported the device gone while the link is still open
    pub fn is_lost(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.lost)
    }

    pub fn ticket(&self) -> Option<LinkTicket> {
        self.active.as_ref().map(|a| a.ticket)
    }

    pub fn rx_mode(&self) -> CodecMode {
        self.rx_mode
    }

    pub fn set_rx_mode(&mut self, mode: CodecMode) {
        self.rx_mode = mode;
    }

    pub fn tx_mode(&self) -> CodecMode {
        self.tx_mode
    }

    pub fn set_tx_mode(&mut self, mode: CodecMode) {
        self.tx_mode = mode;
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Open `port_id` with the current line choices. Any link already open
    /// is closed first. Returns whether the session ended up open.
    pub fn open(
        &mut self,
        port_id: &str,
        choices: &LineChoices,
        notifier: &mut dyn Notifier,
    ) -> bool {
        if self.active.is_some() {
            tlog!("[session] Closing previous link before reopening");
            self.close();
        }

        match self.try_open(port_id, choices) {
            Ok(active) => {
                tlog!(
                    "[session] Open {} at {} (link {})",
                    active.port_id,
                    active.config,
                    active.ticket
                );
                self.active = Some(active);
                true
            }
            Err(e) => {
                report(e, notifier);
                false
            }
        }
    }

    fn try_open(&mut self, port_id: &str, choices: &LineChoices) -> Result<ActiveLink, LinkError> {
        let port_id = port_id.trim();
        if port_id.is_empty() {
            return Err(LinkError::configuration("no port selected"));
        }
        let config = choices.resolve()?;

        let ticket = LinkTicket(self.next_ticket);
        self.next_ticket += 1;

        let handle = self.opener.open(port_id, &config, ticket)?;
        Ok(ActiveLink {
            handle,
            port_id: port_id.to_string(),
            config,
            ticket,
            lost: false,
        })
    }

    /// Release the handle. No-op when already closed.
    pub fn close(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.handle.close();
            tlog!("[session] Closed {} (link {})", active.port_id, active.ticket);
        }
    }

    // ========================================================================
    // Transmit
    // ========================================================================

    /// Compose `text` into bytes with `mode` and write them.
    pub fn send(&mut self, text: &str, mode: CodecMode, notifier: &mut dyn Notifier) -> SendOutcome {
        let Some(active) = self.active.as_mut() else {
            notifier.notify(NOT_OPEN_MESSAGE);
            return SendOutcome::NotOpen;
        };

        let bytes = codec::decode(text, mode);
        let canonical = match mode {
            CodecMode::Hex => Some(codec::encode(&bytes, CodecMode::Hex)),
            _ => None,
        };

        if bytes.is_empty() {
            return SendOutcome::Written {
                bytes: 0,
                canonical,
            };
        }

        match active.handle.write_all(&bytes) {
            Ok(()) => SendOutcome::Written {
                bytes: bytes.len(),
                canonical,
            },
            Err(e) => {
                tlog!("[session] {} byte(s) dropped", bytes.len());
                report(LinkError::Write(e.to_string()), notifier);
                SendOutcome::Failed { canonical }
            }
        }
    }

    // ========================================================================
    // Receive
    // ========================================================================

    /// Handle a backend signal on the owning context. Returns received text
    /// rendered with the RX mode, if any bytes were pulled.
    pub fn on_link_event(&mut self, event: LinkEvent, notifier: &mut dyn Notifier) -> Option<String> {
        let active = match self.active.as_mut() {
            Some(active) if active.ticket == event.ticket() => active,
            _ => {
                let noise = match &event {
                    LinkEvent::BytesAvailable(_) => "bytes available".to_string(),
                    LinkEvent::Fault(_, detail) => detail.clone(),
                };
                tlog!("[session] Signal from link {}", event.ticket());
                report(LinkError::PostClose(noise), notifier);
                return None;
            }
        };

        match event {
            LinkEvent::BytesAvailable(_) => match active.handle.read_available() {
                Ok(bytes) if bytes.is_empty() => None,
                Ok(bytes) => Some(codec::encode(&bytes, self.rx_mode)),
                Err(e) => {
                    tlog!("[session] Forcing close of {}", active.port_id);
                    self.close();
                    report(LinkError::Read(e.to_string()), notifier);
                    None
                }
            },
            LinkEvent::Fault(_, detail) => {
                if !active.lost {
                    active.lost = true;
                    tlog!("[session] {} lost, link kept open", active.port_id);
                    report(LinkError::Read(detail), notifier);
                }
                None
            }
        }
    }
}

/// Log a failure and surface it, unless it is expected noise.
fn report(err: LinkError, notifier: &mut dyn Notifier) {
    tlog!("[session] {}", err);
    if !err.is_suppressed() {
        notifier.notify(&err.user_message());
    }
}

impl Drop for LinkSession {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// Tests
// ============================================================================
