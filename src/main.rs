//! padlaunch - headless launcher driver
//!
//! Wires the controller poller, the focus navigator and the download manager
//! together. Without a physical controller (or with `--demo`) a scripted pad
//! walks through the screens.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use padlaunch::catalog::GameCatalog;
use padlaunch::constants::{APP_NAME, APP_VERSION, MB};
use padlaunch::downloads::{DownloadManager, InstallSink};
use padlaunch::input::{ConnectionEvent, InputPoller, IntentSnapshot, PadButton, PadSource, RawPadState};
use padlaunch::nav::details::DetailsAction;
use padlaunch::nav::downloads::DownloadsAction;
use padlaunch::nav::home::HomeAction;
use padlaunch::nav::modal::ModalAction;
use padlaunch::nav::settings::SettingsAction;
use padlaunch::nav::{NavEvent, NavPorts, Navigator, NoHaptics, NullFocusRegistry, Screen};
use padlaunch::settings::Settings;
use padlaunch::types::{DownloadEvent, Game, Priority};
use padlaunch::utils::{data_dir, format_bytes, format_speed};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

const HERO_SLOTS: usize = 3;
const SECTIONS: [Section; 3] = [Section::Library, Section::Downloads, Section::Settings];
const DETAILS_ACTIONS: [&str; 3] = ["Install", "Info", "Back"];
const INFO_TABS: [(&str, &[&str]); 2] = [
    ("About", &["Description", "Publisher"]),
    ("Requirements", &["Minimum", "Recommended", "Storage"]),
];
const SETTINGS_CATEGORIES: [(&str, &[&str]); 3] = [
    ("Downloads", &["Concurrency limit", "Simulated failures"]),
    ("Navigation", &["Fast repeat"]),
    ("Input", &["Wide deadzone"]),
];
const SETTINGS_BUTTONS: [&str; 2] = ["Save", "Defaults"];
const REPORT_INTERVAL: Duration = Duration::from_secs(1);
const DRAIN_TIMEOUT: Duration = Duration::from_secs(90);

/// Command line options
#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    help: bool,
    demo: bool,
    catalog: Option<PathBuf>,
}

/// `None` when an option is missing its value
fn parse_args(args: &[String]) -> Option<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => parsed.help = true,
            "--demo" => parsed.demo = true,
            "--catalog" => {
                let path = iter.next().filter(|value| !value.starts_with('-'))?;
                parsed.catalog = Some(PathBuf::from(path));
            }
            other => debug!(arg = other, "Ignoring unknown argument"),
        }
    }
    Some(parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Library,
    Downloads,
    Settings,
}

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "padlaunch.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,padlaunch=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn print_help() {
    println!("{APP_NAME} {APP_VERSION}");
    println!();
    println!("USAGE: {APP_NAME} [--demo] [--catalog <path>]");
    println!();
    println!("  --demo            replay a scripted controller instead of a real one");
    println!("  --catalog <path>  JSON array of games (overrides settings)");
    println!();
    println!("Hold Start + Select to quit when using a controller.");
}

fn demo_catalog() -> GameCatalog {
    GameCatalog::from_games(vec![
        Game::new(1, "Skyward Ruins").with_genre("Action").with_platform("PC").with_image("covers/skyward-ruins.jpg"),
        Game::new(2, "Pocket Garden").with_genre("Indie").with_platform("Switch").with_image("covers/pocket-garden.jpg"),
        Game::new(3, "Harbor Lights").with_genre("Puzzle").with_platform("PC").with_image("covers/harbor-lights.jpg"),
        Game::new(4, "Iron Frontier").with_genre("Shooter").with_platform("PC").with_image("covers/iron-frontier.jpg"),
        Game::new(5, "Moss & Mortar").with_genre("Strategy").with_platform("PC").with_image("covers/moss-and-mortar.jpg"),
        Game::new(6, "Tiny Tactics").with_genre("Indie").with_platform("Android").with_image("covers/tiny-tactics.jpg"),
    ])
}

fn load_catalog(path: Option<PathBuf>) -> GameCatalog {
    let Some(path) = path else {
        info!("No catalog configured, using demo catalog");
        return demo_catalog();
    };
    match GameCatalog::load(&path) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, path = %path.display(), "Failed to load catalog, using demo catalog");
            eprintln!("Could not load catalog {}: {e}", path.display());
            demo_catalog()
        }
    }
}

/// Replays a fixed walk through the screens, then unplugs itself
struct ScriptedPad {
    frames: std::vec::IntoIter<RawPadState>,
}

impl ScriptedPad {
    fn new() -> Self {
        use PadButton::*;

        let mut frames = Vec::new();
        let mut hold = |buttons: &[PadButton], held: usize, rest: usize| {
            frames.extend(std::iter::repeat(RawPadState::pressed(buttons)).take(held));
            frames.extend(std::iter::repeat(RawPadState::default()).take(rest));
        };

        hold(&[], 0, 30);
        // Home: into the grid, open the first game, install
        hold(&[DPadDown], 5, 15);
        hold(&[South], 3, 30);
        hold(&[South], 3, 30);
        // Peek at the info modal, flip a tab, close it, back home
        hold(&[DPadRight], 5, 15);
        hold(&[South], 3, 30);
        hold(&[RightBumper], 3, 30);
        hold(&[East], 3, 30);
        hold(&[East], 3, 30);
        // Third game in the grid
        hold(&[DPadDown], 5, 15);
        hold(&[DPadRight], 5, 15);
        hold(&[DPadRight], 5, 15);
        hold(&[South], 3, 30);
        hold(&[South], 3, 30);
        hold(&[East], 3, 30);
        // Sidebar to the downloads screen; pause and resume the first row
        hold(&[Start], 3, 30);
        hold(&[DPadDown], 5, 15);
        hold(&[South], 3, 30);
        hold(&[DPadDown], 5, 15);
        hold(&[South], 3, 90);
        hold(&[South], 3, 30);

        Self {
            frames: frames.into_iter(),
        }
    }
}

impl PadSource for ScriptedPad {
    fn read(&mut self) -> Option<RawPadState> {
        self.frames.next()
    }
}

/// Owns the collaborators and turns navigation events into effects
struct Launcher {
    data_dir: PathBuf,
    settings: Settings,
    catalog: GameCatalog,
    manager: DownloadManager,
    navigator: Navigator,
    sink: Arc<dyn InstallSink>,
    selected: Option<Game>,
    settings_category: usize,
}

impl Launcher {
    /// Push current collection sizes into whichever machine is active
    fn sync(&mut self) {
        let games = self.catalog.len();
        if let Some(nav) = self.navigator.home_mut() {
            nav.set_counts(games.min(HERO_SLOTS), games, SECTIONS.len());
        }
        if let Some(nav) = self.navigator.details_mut() {
            nav.set_count(DETAILS_ACTIONS.len());
        }
        if let Some(nav) = self.navigator.downloads_mut() {
            nav.sync(&self.manager);
        }
        let options = SETTINGS_CATEGORIES
            .get(self.settings_category)
            .map_or(0, |(_, options)| options.len());
        if let Some(nav) = self.navigator.settings_mut() {
            nav.set_counts(SETTINGS_CATEGORIES.len(), options, SETTINGS_BUTTONS.len());
        }
        if let Some(modal) = self.navigator.modal_mut() {
            let items = INFO_TABS.get(modal.tab()).map_or(0, |(_, items)| items.len());
            modal.set_counts(INFO_TABS.len(), items);
        }
    }

    fn handle_frame(&mut self, snapshot: &IntentSnapshot, ports: &mut NavPorts<'_>) {
        self.sync();
        for event in self.navigator.handle_frame(snapshot, Instant::now(), ports) {
            debug!(?event, "Nav event");
            self.handle(event);
        }
    }

    fn handle(&mut self, event: NavEvent) {
        match event {
            NavEvent::Home(HomeAction::HeroAction(index) | HomeAction::OpenGame(index)) => self.open_game(index),
            NavEvent::Home(HomeAction::OpenSection(index)) => match SECTIONS.get(index) {
                Some(Section::Downloads) => {
                    self.navigator.push(Screen::Downloads);
                }
                Some(Section::Settings) => {
                    self.settings_category = 0;
                    self.navigator.push(Screen::Settings);
                }
                Some(Section::Library) | None => {}
            },
            NavEvent::Details(DetailsAction::Invoke(index)) => match DETAILS_ACTIONS.get(index) {
                Some(&"Install") => self.install(),
                Some(&"Info") => {
                    self.navigator.open_modal();
                }
                _ => {
                    self.navigator.pop();
                }
            },
            NavEvent::Downloads(DownloadsAction::SelectFilter(_)) => {
                if let Some(nav) = self.navigator.downloads_mut() {
                    info!(filter = nav.filter().label(), "Download filter");
                }
            }
            NavEvent::Downloads(action) => {
                let target = self.navigator.downloads_mut().and_then(|nav| nav.resolve(action));
                if let Some((id, row_action)) = target {
                    println!("{} download {id}", row_action.label());
                    row_action.perform(&self.manager, id, self.sink.clone());
                }
            }
            NavEvent::Settings(action) => self.settings_action(action),
            NavEvent::Modal(ModalAction::SelectTab(tab)) => {
                debug!(tab = INFO_TABS.get(tab).map(|(name, _)| *name), "Info tab");
            }
            NavEvent::Modal(ModalAction::Activate { tab, item }) => {
                let label = INFO_TABS.get(tab).and_then(|(_, items)| items.get(item));
                info!(?label, "Info item");
            }
            NavEvent::ModalClosed | NavEvent::ScreenChanged { .. } => {}
        }
    }

    fn open_game(&mut self, index: usize) {
        let Some(game) = self.catalog.nth(index) else {
            return;
        };
        println!("Opened {}", game.display_title().unwrap_or("?"));
        self.selected = Some(game);
        self.navigator.push(Screen::Details);
    }

    fn install(&mut self) {
        let Some(game) = &self.selected else {
            return;
        };
        let title = game.display_title().unwrap_or("?");
        match self.manager.start_download(game, Priority::Normal, self.sink.clone()) {
            Ok(()) => println!("Queued {title}"),
            Err(e) => {
                warn!(error = %e, "Install rejected");
                println!("Cannot install {title}: {e}");
            }
        }
    }

    fn settings_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::SelectCategory(index) => self.settings_category = index,
            SettingsAction::ToggleOption(option) => {
                let downloads = &mut self.settings.downloads;
                match (self.settings_category, option) {
                    (0, 0) => downloads.max_concurrent = if downloads.max_concurrent.is_some() { None } else { Some(2) },
                    (0, 1) => downloads.failure_rate = if downloads.failure_rate > 0.0 { 0.0 } else { 0.05 },
                    (1, 0) => {
                        let nav = &mut self.settings.navigation;
                        nav.direction_ms = if nav.direction_ms < 180 { 180 } else { 120 };
                    }
                    (2, 0) => {
                        let input = &mut self.settings.input;
                        input.deadzone = if input.deadzone > 0.2 { 0.18 } else { 0.25 };
                    }
                    _ => return,
                }
                info!(category = self.settings_category, option, "Setting changed, applies on next launch");
            }
            SettingsAction::Button(0) => {
                self.settings.save(&self.data_dir);
                println!("Settings saved");
            }
            SettingsAction::Button(_) => {
                let catalog_path = self.settings.catalog_path.take();
                self.settings = Settings {
                    catalog_path,
                    ..Settings::default()
                };
                info!("Settings reset to defaults");
            }
        }
    }

    fn report(&self) {
        let stats = self.manager.get_download_stats();
        if stats.total == 0 {
            return;
        }
        let progress: Vec<String> = self
            .manager
            .active_downloads()
            .iter()
            .map(|d| {
                format!(
                    "{} {}/{} {} ({})",
                    d.name,
                    format_bytes(d.downloaded_bytes),
                    format_bytes(d.total_bytes),
                    d.status.label(),
                    d.eta
                )
            })
            .collect();
        println!(
            "[{:?}] {} active, {} | {}",
            self.navigator.screen(),
            stats.total,
            format_speed(stats.total_speed),
            progress.join(", ")
        );
    }
}

/// Print notable download events as they happen
fn spawn_event_printer(manager: &DownloadManager, runtime: &Handle) {
    let mut events = manager.subscribe();
    runtime.spawn(async move {
        loop {
            match events.recv().await {
                Ok(DownloadEvent::Completed(id)) => println!("Download {id} completed"),
                Ok(DownloadEvent::Failed(id)) => println!("Download {id} failed"),
                Ok(DownloadEvent::Archived(id)) => println!("Download {id} moved to history"),
                Ok(event) => debug!(game_id = event.game_id(), ?event, "Download event"),
                Err(RecvError::Lagged(missed)) => debug!(missed, "Event printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Feed controller frames to the launcher until the pad goes away or the user quits
fn run<S: PadSource + 'static>(launcher: &mut Launcher, mut poller: InputPoller<S>, scripted: bool) {
    let Some(mut frames) = poller.start() else {
        error!("Input poller failed to start");
        return;
    };

    let mut focus = NullFocusRegistry;
    let haptics = NoHaptics;
    let mut last_report = Instant::now();

    while let Some(snapshot) = frames.blocking_recv() {
        match snapshot.connection {
            Some(ConnectionEvent::Connected) => println!("Controller connected"),
            Some(ConnectionEvent::Disconnected) if scripted => break,
            Some(ConnectionEvent::Disconnected) => println!("Controller disconnected"),
            None => {}
        }
        if snapshot.menu() && snapshot.back() {
            info!("Quit combo pressed");
            break;
        }

        let mut ports = NavPorts::new(&mut focus, &haptics);
        launcher.handle_frame(&snapshot, &mut ports);

        if last_report.elapsed() >= REPORT_INTERVAL {
            launcher.report();
            last_report = Instant::now();
        }
    }
    poller.stop();
}

/// Let running transfers finish so the demo shows completion and archiving
fn drain(launcher: &Launcher, runtime: &Runtime) {
    let deadline = Instant::now() + DRAIN_TIMEOUT;
    runtime.block_on(async {
        while Instant::now() < deadline {
            let stats = launcher.manager.get_download_stats();
            if stats.total == 0 {
                break;
            }
            if stats.downloading + stats.waiting == 0 && stats.completed + stats.failed == 0 {
                // Only paused items left
                break;
            }
            launcher.report();
            tokio::time::sleep(REPORT_INTERVAL).await;
        }
    });
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let Some(cli) = parse_args(&args) else {
        eprintln!("--catalog needs a path");
        print_help();
        return ExitCode::FAILURE;
    };
    if cli.help {
        print_help();
        return ExitCode::SUCCESS;
    }
    let demo = cli.demo || cfg!(not(feature = "gamepad"));

    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, demo, "padlaunch starting");

    let settings = Settings::load(&data_dir);
    let catalog = load_catalog(cli.catalog.or_else(|| settings.catalog_path()));

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to build async runtime");
            eprintln!("Failed to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut download_config = settings.downloads.clone();
    if demo {
        // Demo transfers finish in seconds rather than minutes
        download_config.base_speed_min = 1024.0 * MB;
        download_config.base_speed_max = 2048.0 * MB;
    }
    let manager = DownloadManager::new(download_config, runtime.handle().clone());
    info!(
        max_concurrent = ?manager.config().max_concurrent,
        failure_rate = manager.config().failure_rate,
        "Download manager ready"
    );
    spawn_event_printer(&manager, runtime.handle());

    println!("{APP_NAME} {APP_VERSION}: {} games", catalog.len());

    let input_config = settings.input;
    let mut launcher = Launcher {
        data_dir,
        navigator: Navigator::new(settings.navigation),
        settings,
        sink: Arc::new(catalog.clone()),
        catalog,
        manager,
        selected: None,
        settings_category: 0,
    };

    if demo {
        run(&mut launcher, InputPoller::new(input_config, ScriptedPad::new), true);
        drain(&launcher, &runtime);
    } else {
        run_controller(&mut launcher, input_config);
    }

    launcher.manager.stop();
    let installed = launcher
        .catalog
        .games()
        .iter()
        .filter(|g| g.installed)
        .filter_map(|g| g.display_title().map(str::to_owned))
        .collect::<Vec<_>>();
    println!("Installed: {}", if installed.is_empty() { "none".to_string() } else { installed.join(", ") });
    info!("padlaunch exiting");
    ExitCode::SUCCESS
}

#[cfg(feature = "gamepad")]
fn run_controller(launcher: &mut Launcher, config: padlaunch::settings::InputConfig) {
    use padlaunch::input::GilrsSource;

    let poller = InputPoller::new(config, || {
        GilrsSource::new()
            .map_err(|e| error!(error = %e, "Gamepad backend unavailable"))
            .ok()
    });
    run(launcher, poller, false);
}

#[cfg(not(feature = "gamepad"))]
fn run_controller(_launcher: &mut Launcher, _config: padlaunch::settings::InputConfig) {
    warn!("Built without gamepad support");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once(APP_NAME).chain(list.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_parse_args() {
        let cli = parse_args(&args(&["--demo", "--catalog", "games.json"])).unwrap();
        assert!(cli.demo);
        assert!(!cli.help);
        assert_eq!(cli.catalog, Some(PathBuf::from("games.json")));

        assert_eq!(parse_args(&args(&[])), Some(CliArgs::default()));
        assert!(parse_args(&args(&["-h"])).unwrap().help);
    }

    #[test]
    fn test_catalog_without_path_is_rejected() {
        assert_eq!(parse_args(&args(&["--catalog"])), None);
        assert_eq!(parse_args(&args(&["--catalog", "--demo"])), None);
    }

    #[test]
    fn test_demo_catalog_has_cover_art() {
        let catalog = demo_catalog();
        assert!(catalog.games().iter().all(|g| g.image.is_some()));
    }
}
