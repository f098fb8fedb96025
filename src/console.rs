// src/console.rs
//
// Line-oriented front end and the owning context.
//
// One tokio task owns the registry, the session and the notification timer.
// Everything else (stdin, the byte-arrival threads, the hot-plug watcher,
// countdown tasks) only sends messages into its select loop.

use crossterm::style::Stylize;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::cli::OpenArgs;
use crate::codec::CodecMode;
use crate::io::serial::{SerialOpener, SystemPorts};
use crate::io::{
    BaudRate, HotplugWatcher, LineChoices, LinkEvent, PortDescriptor, PortEnumerator, PortOpener,
    Rescan,
};
use crate::notify::{CountdownElapsed, NotificationTimer, ToastSurface};
use crate::presets;
use crate::registry::PortRegistry;
use crate::session::{LinkSession, SendOutcome};
use crate::settings::AppSettings;

const HELP: &str = "\
Lines are sent to the open port using the TX mode. Start a line with '::' to send a leading ':'.
  :open [port]   open the given or selected port
  :close         close the port
  :ports         rescan and list ports
  :select N|ID   select a port by list index or id
  :rx MODE       receive view: text, hex, escape
  :tx MODE       send encoding: text, hex, escape
  :baud VALUE    baud rate for the next open
  :status        show link state and settings
  :help          this text
  :quit          exit";

// ============================================================================
// Commands
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Open(Option<String>),
    Close,
    Ports,
    Select(String),
    Rx(CodecMode),
    Tx(CodecMode),
    Baud(String),
    Status,
    Help,
    Quit,
}

/// Parse one input line.
pub fn parse_line(line: &str) -> Result<Command, String> {
    if let Some(rest) = line.strip_prefix("::") {
        return Ok(Command::Send(format!(":{}", rest)));
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Command::Send(line.to_string()));
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("Too many arguments to :{}", name));
    }

    let required = |what: &str| arg.ok_or_else(|| format!(":{} needs {}", name, what));

    match name {
        "open" | "o" => Ok(Command::Open(arg.map(str::to_string))),
        "close" | "c" => Ok(Command::Close),
        "ports" | "p" | "rescan" => Ok(Command::Ports),
        "select" | "s" => Ok(Command::Select(required("an index or port id")?.to_string())),
        "rx" => Ok(Command::Rx(required("a mode")?.parse()?)),
        "tx" => Ok(Command::Tx(required("a mode")?.parse()?)),
        "baud" | "b" => Ok(Command::Baud(required("a value")?.to_string())),
        "status" => Ok(Command::Status),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "" => Err("Empty command, try :help".to_string()),
        other => Err(format!("Unknown command ':{}', try :help", other)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// ============================================================================
// Toast Surface
// ============================================================================

/// Prints toasts to stderr. A message is printed when it appears and again
/// whenever a later notification replaces it while still visible.
#[derive(Default)]
pub struct TerminalToast {
    text: String,
    visible: bool,
}

impl TerminalToast {
    fn print(&self) {
        let text = self.text.replace('\n', ": ");
        eprintln!("{}", format!("[!] {}", text).yellow().bold());
    }
}

impl ToastSurface for TerminalToast {
    fn show_text(&mut self, text: &str) {
        self.text = text.to_string();
        if self.visible {
            self.print();
        }
    }

    fn appear(&mut self) {
        self.visible = true;
        self.print();
    }

    fn dismiss(&mut self) {
        self.visible = false;
    }
}

// ============================================================================
// Console State
// ============================================================================

pub struct Console<S: ToastSurface, W: Write> {
    registry: PortRegistry,
    session: LinkSession,
    toast: NotificationTimer<S>,
    choices: LineChoices,
    out: W,
}

impl<S: ToastSurface, W: Write> Console<S, W> {
    pub fn new(
        enumerator: Arc<dyn PortEnumerator>,
        opener: Box<dyn PortOpener>,
        toast: NotificationTimer<S>,
        settings: &AppSettings,
        out: W,
    ) -> Self {
        let mut session = LinkSession::new(opener);
        session.set_rx_mode(settings.rx_mode);
        session.set_tx_mode(settings.tx_mode);

        let mut registry = PortRegistry::new(enumerator);
        registry.rescan(None);

        Self {
            registry,
            session,
            toast,
            choices: settings.line_choices(),
            out,
        }
    }

    /// Handle a line typed by the user.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        match parse_line(line) {
            Ok(command) => self.execute(command),
            Err(e) => {
                self.say(&e);
                Flow::Continue
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::Send(text) => self.send(&text),
            Command::Open(port) => self.open(port.as_deref()),
            Command::Close => {
                if self.session.is_open() {
                    self.session.close();
                    self.say("Closed");
                }
                self.registry.rescan(None);
            }
            Command::Ports => {
                self.registry.rescan(self.session.port_id());
                self.print_ports();
            }
            Command::Select(target) => self.select(&target),
            Command::Rx(mode) => {
                self.session.set_rx_mode(mode);
                self.say(&format!("RX mode: {}", mode));
            }
            Command::Tx(mode) => {
                self.session.set_tx_mode(mode);
                self.say(&format!("TX mode: {}", mode));
            }
            Command::Baud(value) => {
                self.choices.baud = BaudRate::from_text(&value);
                if self.session.is_open() {
                    self.say(&format!("Baud {} applies on next :open", self.choices.baud));
                } else {
                    self.say(&format!("Baud {}", self.choices.baud));
                }
            }
            Command::Status => self.print_status(),
            Command::Help => self.say(HELP),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn open(&mut self, port: Option<&str>) {
        let port_id = match port {
            Some(port) => port.to_string(),
            None => self
                .registry
                .selected()
                .map(|d| d.id.clone())
                .unwrap_or_default(),
        };

        if self.session.open(&port_id, &self.choices, &mut self.toast) {
            self.registry.rescan(self.session.port_id());
            self.registry.select_id(&port_id);
            let summary = self
                .session
                .config()
                .map(|c| c.to_string())
                .unwrap_or_default();
            self.say(&format!("Opened {} at {}", port_id, summary));
        } else {
            // A previous link may have been closed on the way
            self.registry.rescan(self.session.port_id());
        }
    }

    fn send(&mut self, text: &str) {
        let mode = self.session.tx_mode();
        match self.session.send(text, mode, &mut self.toast) {
            SendOutcome::Written { canonical, .. } | SendOutcome::Failed { canonical } => {
                if let Some(canonical) = canonical {
                    self.say(&format!("> {}", canonical));
                }
            }
            SendOutcome::NotOpen => {}
        }
    }

    fn select(&mut self, target: &str) {
        let found = match target.parse::<usize>() {
            Ok(index) => self.registry.select(index).cloned(),
            Err(_) => self.registry.select_id(target).cloned(),
        };
        match found {
            Some(port) => self.say(&format!("Selected {}", port.label)),
            None => self.say(&format!("No port '{}'", target)),
        }
    }

    /// A backend signal arrived.
    pub fn on_link_event(&mut self, event: LinkEvent) {
        let was_open = self.session.is_open();
        if let Some(text) = self.session.on_link_event(event, &mut self.toast) {
            self.emit(&text);
        }
        if was_open && !self.session.is_open() {
            self.registry.rescan(None);
        }
    }

    /// The hot-plug watcher saw the device set change.
    pub fn on_rescan(&mut self) {
        self.registry.rescan(self.session.port_id());
        self.print_ports();
    }

    pub fn on_elapsed(&mut self, elapsed: CountdownElapsed) {
        self.toast.on_elapsed(elapsed);
    }

    pub fn close(&mut self) {
        self.session.close();
    }

    fn print_ports(&mut self) {
        let listing = format_ports(self.registry.ports(), self.registry.selected_index());
        self.say(&listing);
    }

    fn print_status(&mut self) {
        let link = match (self.session.port_id(), self.session.config()) {
            (Some(port), Some(config)) if self.session.is_lost() => {
                format!("open {} at {} (device lost, :close to release)", port, config)
            }
            (Some(port), Some(config)) => format!("open {} at {}", port, config),
            _ => "closed".to_string(),
        };
        let status = format!(
            "Link:   {}\nRX:     {}\nTX:     {}\nNext:   {} baud, {} data bits, parity {}, {} stop",
            link,
            self.session.rx_mode(),
            self.session.tx_mode(),
            self.choices.baud,
            self.choices.data_bits,
            presets::parity_name(self.choices.parity),
            presets::stop_bits_name(self.choices.stop_bits),
        );
        self.say(&status);
    }

    fn say(&mut self, text: &str) {
        self.emit(&format!("{}\n", text));
    }

    fn emit(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            tlog!("[console] Output dropped: {}", e);
        }
    }
}

pub fn format_ports(ports: &[PortDescriptor], selected: Option<usize>) -> String {
    if ports.is_empty() {
        return "No serial ports found".to_string();
    }
    ports
        .iter()
        .enumerate()
        .map(|(i, port)| {
            let marker = if selected == Some(i) { '*' } else { ' ' };
            format!("{} [{}] {}", marker, i, port.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Entry Points
// ============================================================================

/// `serial-debug list`
pub fn print_port_list() {
    let mut registry = PortRegistry::new(Arc::new(SystemPorts));
    registry.rescan(None);
    println!("{}", format_ports(registry.ports(), registry.selected_index()));
}

/// The interactive console. Returns when stdin closes or on `:quit`.
pub async fn run(mut settings: AppSettings, args: OpenArgs) {
    let custom_baud = args.apply_to(&mut settings);

    let (link_tx, mut link_rx) = mpsc::unbounded_channel::<LinkEvent>();
    let (rescan_tx, mut rescan_rx) = mpsc::unbounded_channel::<Rescan>();
    let (elapsed_tx, mut elapsed_rx) = mpsc::unbounded_channel::<CountdownElapsed>();

    let enumerator: Arc<dyn PortEnumerator> = Arc::new(SystemPorts);
    let _watcher = HotplugWatcher::spawn(enumerator.clone(), settings.rescan_interval(), rescan_tx);

    let toast = NotificationTimer::new(
        TerminalToast::default(),
        settings.notification_duration(),
        elapsed_tx,
    );
    let mut console = Console::new(
        enumerator,
        Box::new(SerialOpener::new(link_tx)),
        toast,
        &settings,
        std::io::stdout(),
    );

    // Reported when the port is opened, like a bad value typed at :baud
    if let Some(text) = custom_baud {
        console.choices.baud = BaudRate::Custom(text);
    }

    console.print_ports();
    console.say("Type :help for commands");
    if let Some(port) = args.port.as_deref() {
        console.open(Some(port));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if console.handle_line(&line) == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tlog!("[console] stdin: {}", e);
                    break;
                }
            },
            Some(event) = link_rx.recv() => console.on_link_event(event),
            Some(Rescan) = rescan_rx.recv() => console.on_rescan(),
            Some(elapsed) = elapsed_rx.recv() => console.on_elapsed(elapsed),
        }
    }

    console.close();
}

// ============================================================================
// Tests
// ============================================================================
