use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use zone_tabs::assigned::{AssignedWindows, CycleOutcome, ZoneIndexSet};
use zone_tabs::host::{MemoryHost, WindowSystem};
use zone_tabs::keybindings::{Action, KeyBindings};
use zone_tabs::layout::{MAX_ZONES, shift_zone_set};
use zone_tabs::settings::ZoneSettings;
use zone_tabs::tracing_sub::{self, LogTarget};
use zone_tabs::ui::{self, SceneView};

type DemoWindow = usize;

const MAX_WINDOWS: usize = 32;
const MAX_DESKTOPS: usize = 4;

#[derive(Parser, Debug)]
#[command(
    name = "zone-tabs",
    version = env!("CARGO_PKG_VERSION"),
    about = "Snap simulated windows into zones and cycle through their tabs"
)]
struct DemoCli {
    /// Number of zone columns to lay out.
    #[arg(short = 'z', long = "zones", value_name = "COUNT", default_value_t = 3)]
    zones: usize,

    /// Number of virtual desktops to simulate.
    #[arg(short = 'd', long = "desktops", value_name = "COUNT", default_value_t = 2)]
    desktops: usize,

    /// Strip rounded corners from windows when they are snapped.
    #[arg(long = "disable-round-corners")]
    disable_round_corners: bool,

    /// Append debug logs to this file. Logs are dropped otherwise.
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

struct DemoConfig {
    zones: usize,
    desktops: usize,
    settings: ZoneSettings,
    log_target: LogTarget,
}

impl TryFrom<&DemoCli> for DemoConfig {
    type Error = String;

    fn try_from(cli: &DemoCli) -> Result<Self, Self::Error> {
        if !(1..=MAX_ZONES).contains(&cli.zones) {
            return Err(format!("zones must be between 1 and {MAX_ZONES}"));
        }
        if !(1..=MAX_DESKTOPS).contains(&cli.desktops) {
            return Err(format!("desktops must be between 1 and {MAX_DESKTOPS}"));
        }
        let log_target = match &cli.log_file {
            Some(path) => LogTarget::File(path.clone()),
            None => LogTarget::Discard,
        };
        Ok(Self {
            zones: cli.zones,
            desktops: cli.desktops,
            settings: ZoneSettings::new().with_disable_round_corners(cli.disable_round_corners),
            log_target,
        })
    }
}

fn main() -> io::Result<()> {
    let cli = DemoCli::parse();
    let config = DemoConfig::try_from(&cli)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;
    tracing_sub::init_default(&config.log_target)?;

    let mut app = App::new(&config);
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    terminal::enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| {
            let view = SceneView {
                assigned: &app.assigned,
                host: &app.host,
                zone_count: app.zone_count,
                desktops: app.desktops,
                status: &app.status,
                help: app.help_visible.then_some(&app.bindings),
            };
            ui::draw(frame, &view);
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(action) = app.bindings.action_for_key(&key) else {
            continue;
        };
        if action == Action::Quit {
            return Ok(());
        }
        app.apply(action);
    }
}

struct App {
    assigned: AssignedWindows<DemoWindow>,
    host: MemoryHost<DemoWindow>,
    bindings: KeyBindings,
    zone_count: usize,
    desktops: usize,
    next_window: DemoWindow,
    status: String,
    help_visible: bool,
}

impl App {
    fn new(config: &DemoConfig) -> Self {
        Self {
            assigned: AssignedWindows::new(config.settings),
            host: MemoryHost::new(),
            bindings: KeyBindings::default(),
            zone_count: config.zones,
            desktops: config.desktops,
            next_window: 1,
            status: "press n to open a window".to_string(),
            help_visible: false,
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => {}
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::NewWindow => self.new_window(),
            Action::CycleNextTab => self.cycle(false),
            Action::CyclePrevTab => self.cycle(true),
            Action::MoveLeft => self.shift(-1),
            Action::MoveRight => self.shift(1),
            Action::ExtendSpan => self.resize_span(true),
            Action::ShrinkSpan => self.resize_span(false),
            Action::Unsnap => {
                if let Some(w) = self.focused() {
                    self.assigned.dismiss(&mut self.host, w);
                    self.status = format!("W{w} unsnapped");
                }
            }
            Action::FocusZoneLeft => self.focus_neighbour(-1),
            Action::FocusZoneRight => self.focus_neighbour(1),
            Action::CloseWindow => {
                if let Some(w) = self.focused() {
                    self.host.close_window(w);
                    self.status = format!("W{w} closed; its tab stays until cycling prunes it");
                }
            }
            Action::SendToNextDesktop => {
                if let Some(w) = self.focused() {
                    let desktop = (self.host.current_desktop() + 1) % self.desktops;
                    self.host.move_to_desktop(w, desktop);
                    self.status = format!("W{w} sent to desktop {}", desktop + 1);
                }
            }
            Action::SwitchDesktop => {
                let desktop = (self.host.current_desktop() + 1) % self.desktops;
                self.host.switch_desktop(desktop);
                self.status = format!("switched to desktop {}", desktop + 1);
            }
        }
    }

    fn focused(&mut self) -> Option<DemoWindow> {
        let focused = self.host.foreground();
        if focused.is_none() {
            self.status = "no focused window".to_string();
        }
        focused
    }

    fn focused_zones(&self) -> ZoneIndexSet {
        self.host
            .foreground()
            .map(|w| self.assigned.zone_index_set_from_window(w))
            .unwrap_or_default()
    }

    fn new_window(&mut self) {
        if self.host.live_windows().count() >= MAX_WINDOWS {
            self.status = format!("window limit of {MAX_WINDOWS} reached");
            return;
        }
        let zones = match self.focused_zones() {
            zones if zones.is_empty() => vec![0],
            zones => zones,
        };
        let w = self.next_window;
        self.next_window += 1;
        self.host.open_window(w);
        self.assigned.assign(&mut self.host, w, &zones);
        self.host.activate(w);
        self.status = format!("W{w} opened in {zones:?}");
    }

    fn cycle(&mut self, reverse: bool) {
        let Some(w) = self.focused() else {
            return;
        };
        self.status = match self.assigned.cycle_windows(&mut self.host, w, reverse) {
            CycleOutcome::Untracked => format!("W{w} is not snapped"),
            CycleOutcome::Exhausted => "no tabs left in this zone".to_string(),
            CycleOutcome::Activated(next) => format!("switched to W{next}"),
            CycleOutcome::OtherDesktop(next) => {
                format!("next tab W{next} is on another desktop")
            }
        };
    }

    fn shift(&mut self, delta: isize) {
        let Some(w) = self.focused() else {
            return;
        };
        let zones = self.assigned.zone_index_set_from_window(w);
        let target = if zones.is_empty() {
            Some(vec![0])
        } else {
            shift_zone_set(&zones, delta, self.zone_count)
        };
        match target {
            Some(target) => {
                self.assigned.assign(&mut self.host, w, &target);
                self.status = format!("W{w} moved to {target:?}");
            }
            None => self.status = "no zone in that direction".to_string(),
        }
    }

    fn resize_span(&mut self, grow: bool) {
        let Some(w) = self.focused() else {
            return;
        };
        let mut zones = self.assigned.zone_index_set_from_window(w);
        if grow {
            let next = zones.iter().max().map_or(0, |z| z + 1);
            if next >= self.zone_count {
                self.status = "already spans the last zone".to_string();
                return;
            }
            zones.push(next);
        } else if zones.len() > 1 {
            zones.pop();
        } else {
            self.status = "a snapped window keeps at least one zone".to_string();
            return;
        }
        self.assigned.assign(&mut self.host, w, &zones);
        self.status = format!("W{w} now spans {zones:?}");
    }

    fn focus_neighbour(&mut self, delta: isize) {
        let zones = self.focused_zones();
        let edge = if delta < 0 {
            zones.iter().min().and_then(|z| z.checked_sub(1))
        } else {
            zones.iter().max().map(|z| z + 1)
        };
        let Some(target) = edge.filter(|z| *z < self.zone_count) else {
            self.status = "no zone in that direction".to_string();
            return;
        };
        match self
            .assigned
            .topmost_window_from_target_zone(&self.host, target, &zones)
        {
            Some(w) if self.host.is_on_current_desktop(w) => {
                self.host.activate(w);
                self.status = format!("focused W{w} in zone {target}");
            }
            Some(w) => self.status = format!("W{w} in zone {target} is on another desktop"),
            None => self.status = format!("zone {target} has no windows"),
        }
    }
}
