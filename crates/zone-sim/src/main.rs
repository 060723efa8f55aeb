use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use indoc::formatdoc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use zone_tabs::assigned::{AssignedWindows, CycleOutcome, ZoneIndex};
use zone_tabs::host::{MemoryHost, WindowSystem};
use zone_tabs::settings::ZoneSettings;
use zone_tabs::tracing_sub::{self, LogTarget};

type SimWindow = u32;

#[derive(Parser, Debug)]
#[command(
    name = "zone-sim",
    version = env!("CARGO_PKG_VERSION"),
    about = "Drive zone assignment through random window events and audit it after every step"
)]
struct SimCli {
    /// Number of random events to apply.
    #[arg(short = 'n', long = "steps", value_name = "COUNT", default_value_t = 10_000)]
    steps: usize,

    /// Size of the window id pool.
    #[arg(short = 'w', long = "windows", value_name = "COUNT", default_value_t = 12)]
    windows: u32,

    /// Number of zones in the simulated layout.
    #[arg(short = 'z', long = "zones", value_name = "COUNT", default_value_t = 4)]
    zones: usize,

    /// Number of virtual desktops.
    #[arg(short = 'd', long = "desktops", value_name = "COUNT", default_value_t = 2)]
    desktops: usize,

    /// RNG seed. Defaults to the clock; the seed used is always printed.
    #[arg(short = 's', long = "seed", value_name = "SEED")]
    seed: Option<u64>,

    /// Strip rounded corners on assignment.
    #[arg(long = "disable-round-corners")]
    disable_round_corners: bool,

    /// Log every bookkeeping step to stderr.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

struct SimConfig {
    steps: usize,
    windows: u32,
    zones: usize,
    desktops: usize,
    seed: u64,
    settings: ZoneSettings,
}

impl TryFrom<&SimCli> for SimConfig {
    type Error = String;

    fn try_from(cli: &SimCli) -> Result<Self, Self::Error> {
        if !(1..=1_000_000).contains(&cli.steps) {
            return Err("steps must be between 1 and 1000000".to_string());
        }
        if !(1..=256).contains(&cli.windows) {
            return Err("windows must be between 1 and 256".to_string());
        }
        if !(1..=16).contains(&cli.zones) {
            return Err("zones must be between 1 and 16".to_string());
        }
        if !(1..=8).contains(&cli.desktops) {
            return Err("desktops must be between 1 and 8".to_string());
        }
        let seed = cli.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });
        Ok(Self {
            steps: cli.steps,
            windows: cli.windows,
            zones: cli.zones,
            desktops: cli.desktops,
            seed,
            settings: ZoneSettings::new().with_disable_round_corners(cli.disable_round_corners),
        })
    }
}

#[derive(Debug, Default)]
struct SimStats {
    opened: usize,
    closed: usize,
    assigned: usize,
    dismissed: usize,
    cycles: usize,
    activated: usize,
    other_desktop: usize,
    exhausted: usize,
    pruned: usize,
    topmost_queries: usize,
    topmost_hits: usize,
    desktop_moves: usize,
}

impl SimStats {
    fn report(&self, config: &SimConfig) -> String {
        formatdoc! {"
            seed {seed}: {steps} steps over {windows} windows, {zones} zones, {desktops} desktops
              windows   opened {opened}, closed {closed}, moved desktop {desktop_moves}
              snapping  assigned {assigned}, dismissed {dismissed}
              cycling   {cycles} requests: {activated} activated, {other_desktop} on other desktop
                        {exhausted} exhausted, {pruned} stale tabs pruned
              topmost   {topmost_queries} queries, {topmost_hits} resolved",
            seed = config.seed,
            steps = config.steps,
            windows = config.windows,
            zones = config.zones,
            desktops = config.desktops,
            opened = self.opened,
            closed = self.closed,
            desktop_moves = self.desktop_moves,
            assigned = self.assigned,
            dismissed = self.dismissed,
            cycles = self.cycles,
            activated = self.activated,
            other_desktop = self.other_desktop,
            exhausted = self.exhausted,
            pruned = self.pruned,
            topmost_queries = self.topmost_queries,
            topmost_hits = self.topmost_hits,
        }
    }
}

struct Simulation {
    config: SimConfig,
    rng: StdRng,
    host: MemoryHost<SimWindow>,
    assigned: AssignedWindows<SimWindow>,
    stats: SimStats,
}

impl Simulation {
    fn new(config: SimConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            host: MemoryHost::new(),
            assigned: AssignedWindows::new(config.settings),
            stats: SimStats::default(),
            config,
        }
    }

    fn run(&mut self) -> Result<(), String> {
        for step in 0..self.config.steps {
            self.step().map_err(|msg| format!("step {step}: {msg}"))?;
            self.assigned
                .validate()
                .map_err(|err| format!("step {step}: {err}"))?;
        }
        Ok(())
    }

    fn pick_window(&mut self) -> SimWindow {
        self.rng.gen_range(0..self.config.windows)
    }

    fn pick_zones(&mut self) -> Vec<ZoneIndex> {
        let len = self.rng.gen_range(1..=self.config.zones.min(3));
        (0..len)
            .map(|_| self.rng.gen_range(0..self.config.zones))
            .collect()
    }

    fn step(&mut self) -> Result<(), String> {
        let window = self.pick_window();
        match self.rng.gen_range(0..9) {
            0 => {
                if !self.host.is_window_live(window) {
                    self.host.open_window(window);
                    self.stats.opened += 1;
                }
            }
            1 | 2 => {
                if self.host.is_window_live(window) {
                    let zones = self.pick_zones();
                    self.assigned.assign(&mut self.host, window, &zones);
                    self.stats.assigned += 1;
                    if self.assigned.zone_index_set_from_window(window) != zones {
                        return Err(format!("W{window} not recorded under {zones:?}"));
                    }
                    if self.config.settings.disable_round_corners()
                        && !self.host.round_corners_disabled(window)
                    {
                        return Err(format!("W{window} kept its rounded corners"));
                    }
                }
            }
            3 => {
                self.assigned.dismiss(&mut self.host, window);
                self.stats.dismissed += 1;
            }
            4 => {
                if self.host.close_window(window) {
                    self.stats.closed += 1;
                }
            }
            5 | 6 => self.cycle(window)?,
            7 => {
                if self.rng.gen_bool(0.5) {
                    let desktop = self.rng.gen_range(0..self.config.desktops);
                    self.host.switch_desktop(desktop);
                } else if self.host.is_window_live(window) {
                    let desktop = self.rng.gen_range(0..self.config.desktops);
                    self.host.move_to_desktop(window, desktop);
                    self.stats.desktop_moves += 1;
                }
            }
            _ => self.topmost(window)?,
        }
        Ok(())
    }

    fn cycle(&mut self, window: SimWindow) -> Result<(), String> {
        let reverse = self.rng.gen_bool(0.5);
        let before = self.assigned.len();
        let outcome = self.assigned.cycle_windows(&mut self.host, window, reverse);
        self.stats.cycles += 1;
        self.stats.pruned += before - self.assigned.len();

        match outcome {
            CycleOutcome::Untracked | CycleOutcome::Exhausted => {
                if outcome == CycleOutcome::Exhausted {
                    self.stats.exhausted += 1;
                }
            }
            CycleOutcome::Activated(next) => {
                self.stats.activated += 1;
                if self.host.foreground() != Some(next) {
                    return Err(format!("cycling reported W{next} active but it is not"));
                }
            }
            CycleOutcome::OtherDesktop(next) => {
                self.stats.other_desktop += 1;
                if self.host.is_on_current_desktop(next) {
                    return Err(format!("W{next} reported on another desktop"));
                }
            }
        }
        Ok(())
    }

    fn topmost(&mut self, window: SimWindow) -> Result<(), String> {
        let target = self.rng.gen_range(0..self.config.zones);
        let current = self.assigned.zone_index_set_from_window(window);
        self.stats.topmost_queries += 1;
        let Some(found) =
            self.assigned
                .topmost_window_from_target_zone(&self.host, target, &current)
        else {
            return Ok(());
        };

        self.stats.topmost_hits += 1;
        let zones = self.assigned.zone_index_set_from_window(found);
        if zones == current || !zones.contains(&target) {
            return Err(format!(
                "topmost for zone {target} returned W{found} from {zones:?}"
            ));
        }
        Ok(())
    }
}

fn main() -> io::Result<()> {
    let args = SimCli::parse();
    let config = SimConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;
    let log_target = if args.verbose {
        LogTarget::Stderr
    } else {
        LogTarget::Discard
    };
    tracing_sub::init_default(&log_target)?;

    let mut sim = Simulation::new(config);
    let outcome = sim.run();
    println!("{}", sim.stats.report(&sim.config));

    if let Err(msg) = outcome {
        tracing::error!(seed = sim.config.seed, "{msg}");
        eprintln!("audit failed (seed {}): {msg}", sim.config.seed);
        std::process::exit(1);
    }
    Ok(())
}
