mod ui;

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use gtk4::glib;
use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow};
use netpanel::backend::SignalSender;
use netpanel::backend::mock::MockBackend;
use netpanel::backend::nm::NetworkManagerBackend;
use netpanel::{
    BackendKind, ConnectionManager, FileSettingsStore, MemorySettingsStore, NetworkingController,
    PanelConfig, SettingsStore, logging,
};
use tracing::{info, warn};
use ui::{GtkPrompter, Panel};

#[derive(Debug, Parser)]
#[command(name = "netpanel")]
#[command(about = "Wi-Fi, tethering and cellular settings panel")]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run against built-in demo networks instead of NetworkManager
    #[arg(long)]
    mock: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> glib::ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match PanelConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("netpanel: {e}");
                return glib::ExitCode::FAILURE;
            }
        },
        None => PanelConfig::default(),
    };
    logging::init(logging::verbosity(args.verbose, config.log_level));

    let use_mock = args.mock || config.backend == BackendKind::Mock;

    let app = Application::builder()
        .application_id("io.github.netpanel")
        .build();

    app.connect_activate(move |app| build_ui(app, &config, use_mock));
    // Our own flags are already parsed; keep GTK from seeing them.
    app.run_with_args(&["netpanel"])
}

fn build_ui(app: &Application, config: &PanelConfig, use_mock: bool) {
    ui::load_css();

    let window = ApplicationWindow::builder()
        .application(app)
        .title("Network")
        .default_width(360)
        .default_height(720)
        .build();
    window.add_css_class("netpanel-window");

    let (tx, rx) = mpsc::channel();
    let controller = NetworkingController::new(
        open_backend(tx, config, use_mock),
        open_settings(config),
        GtkPrompter::new(&window),
        rx,
    )
    .with_advanced(config.show_advanced);

    let panel = Panel::new(&window, controller);

    let on_map = Rc::clone(&panel);
    window.connect_map(move |_| on_map.activate());
    let on_unmap = Rc::clone(&panel);
    window.connect_unmap(move |_| on_unmap.deactivate());

    window.present();
}

fn open_backend(tx: SignalSender, config: &PanelConfig, use_mock: bool) -> Box<dyn ConnectionManager> {
    if use_mock {
        info!("using demo backend");
        return Box::new(MockBackend::demo().with_signals(tx));
    }

    let interval = Duration::from_secs(config.scan_interval_secs);
    match NetworkManagerBackend::new(tx.clone(), interval) {
        Ok(backend) => Box::new(backend),
        Err(err) => {
            warn!("NetworkManager backend unavailable: {err}. Falling back to demo data.");
            Box::new(MockBackend::demo().with_signals(tx))
        }
    }
}

fn open_settings(config: &PanelConfig) -> Box<dyn SettingsStore> {
    match FileSettingsStore::open(&config.settings_dir) {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!("{err}. Settings will not persist.");
            Box::new(MemorySettingsStore::new())
        }
    }
}
