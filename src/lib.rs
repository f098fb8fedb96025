#[macro_use]
mod logging;

pub mod cli;
pub mod codec;
pub mod console;
pub mod io;
pub mod notify;
pub mod presets;
pub mod registry;
pub mod session;
pub mod settings;

use clap::Parser;

use cli::{Cli, Commands};

pub fn run() {
    let cli = Cli::parse();

    let settings_path = match cli.config.clone() {
        Some(path) => path,
        None => match settings::default_settings_path() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("[setup] {}", e);
                std::process::exit(1);
            }
        },
    };

    let app_settings = match settings::load_settings(&settings_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[setup] {}: {}", settings_path.display(), e);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Open(Default::default())) {
        Commands::List => console::print_port_list(),
        Commands::Open(args) => {
            // The console owns the terminal; logs go to the file unless asked for
            logging::set_stderr_logging(cli.verbose);
            if let Some(dir) = app_settings.log_dir.as_deref() {
                if let Err(e) = logging::init_file_logging(dir) {
                    eprintln!("[setup] {}", e);
                }
            }

            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("[setup] Failed to start runtime: {}", e);
                    std::process::exit(1);
                }
            };
            runtime.block_on(console::run(app_settings, args));

            logging::stop_file_logging();
        }
    }
}
