use std::{path::PathBuf, thread, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};
use soundjam_core::{
    AppConfig, Board, Bounds, CircularProgressBar, ControlFlow, DropData, HoldButton,
    ImportEvent, LineCap, MonotonicClock, PoofAnimation, ProgressState, Release, SpriteSheet,
    SvgCanvas, Tile, TimerQueue,
};
use tracing_subscriber::EnvFilter;

fn main() -> soundjam_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Geometry { dial } => run_geometry(&config, &dial),
        Commands::Render { dial, output } => run_render(&config, &dial, &output),
        Commands::Poof {
            sprite,
            frames,
            realtime,
        } => run_poof(&config, sprite, frames, realtime),
        Commands::Hold { press_ms } => run_hold(&config, press_ms),
        Commands::Import { paths, columns } => run_import(&config, &paths, columns),
    }
}

fn run_geometry(config: &AppConfig, dial: &DialArgs) -> soundjam_core::Result<()> {
    let mut bar = dial.build(config);
    let geometry = bar.draw(dial.bounds());
    tracing::debug!(commands = geometry.commands.len(), "computed dial geometry");
    println!("{}", serde_json::to_string_pretty(&geometry)?);
    Ok(())
}

fn run_render(config: &AppConfig, dial: &DialArgs, output: &PathBuf) -> soundjam_core::Result<()> {
    let mut bar = dial.build(config);
    let geometry = bar.draw(dial.bounds());
    std::fs::write(output, SvgCanvas::render(&geometry))?;
    tracing::info!(?output, radius = geometry.radius, "wrote dial");
    Ok(())
}

fn run_poof(
    config: &AppConfig,
    sprite: Option<PathBuf>,
    frames: u32,
    realtime: bool,
) -> soundjam_core::Result<()> {
    let sheet = match sprite {
        Some(path) => SpriteSheet::load(&path)?,
        None => SpriteSheet::from_dimensions(1, frames)?,
    };
    let mut poof = PoofAnimation::from_config(sheet, &config.animation);
    let mut timers = TimerQueue::new();
    let clock = MonotonicClock::start();

    let start = if realtime { clock.now_micros() } else { 0 };
    poof.show(&mut timers, start, ());

    while let Some(due) = timers.next_due() {
        let now = if realtime {
            let current = clock.now_micros();
            if due > current {
                thread::sleep(Duration::from_micros(due - current));
            }
            clock.now_micros()
        } else {
            due
        };

        timers.fire_due(now, |_, _| poof.animate(now));
        if poof.take_redraw() {
            if let Some(blit) = poof.blit() {
                println!(
                    "{:>6.1}ms  frame {:>2}  y {:>4}",
                    (now - start) as f64 / 1_000.0,
                    blit.frame,
                    blit.source_y
                );
            }
        }
    }

    println!("{:>6.1}ms  hidden", poof.clock().elapsed_micros() as f64 / 1_000.0);
    Ok(())
}

fn run_hold(config: &AppConfig, press_ms: u64) -> soundjam_core::Result<()> {
    let mut button = HoldButton::from_config(&config.hold);
    let mut timers = TimerQueue::new();

    button.press(&mut timers, 0, ());
    let release_at = press_ms.saturating_mul(1_000);
    timers.fire_due(release_at, |_, _| {
        button.on_timeout();
        println!("held");
        ControlFlow::Break
    });

    match button.release(&mut timers) {
        Release::Click => println!("clicked"),
        Release::Suppressed => tracing::debug!("click suppressed after hold"),
    }
    Ok(())
}

fn run_import(config: &AppConfig, paths: &[PathBuf], columns: usize) -> soundjam_core::Result<()> {
    let mut board = Board::new(&config.board);
    let payload = DropData::from_paths(paths)?;
    let events = board.import_drop(payload, config.board.import_throttle())?;
    for event in events.iter() {
        if let ImportEvent::Finished { accepted, skipped } = event {
            tracing::info!(accepted, skipped, "drop handled");
            break;
        }
        board.apply_import(&event);
    }

    for (row, tiles) in board.rows(columns).enumerate() {
        for tile in tiles {
            if let Tile::Clip(clip) = tile {
                println!("{row}\t{}\t{}", clip.name, clip.path.display());
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Soundboard engine toolbox", long_about = None)]
struct Cli {
    /// JSON config file overriding the built-in defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the circular progress dial layout as JSON.
    Geometry {
        #[command(flatten)]
        dial: DialArgs,
    },
    /// Draw the circular progress dial into an SVG file.
    Render {
        #[command(flatten)]
        dial: DialArgs,
        /// Where to write the SVG document.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Step through one poof animation run and print the frames.
    Poof {
        /// Raster sprite sheet (PNG, JPEG, GIF, BMP, WebP...) with square
        /// frames stacked vertically. SVG is not supported.
        #[arg(long, conflicts_with = "frames")]
        sprite: Option<PathBuf>,
        /// Frame count to simulate when no sprite sheet is given.
        #[arg(long, default_value_t = 5)]
        frames: u32,
        /// Sleep between ticks instead of jumping straight to each one.
        #[arg(long)]
        realtime: bool,
    },
    /// Report whether a press of the given length is a click or a hold.
    Hold {
        #[arg(long)]
        press_ms: u64,
    },
    /// Drop files onto an empty board and list the resulting tiles by row.
    Import {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Tiles that fit on one row; clamped to the configured per-line bounds.
        #[arg(long, default_value_t = 10)]
        columns: usize,
    },
}

#[derive(Args, Debug)]
struct DialArgs {
    #[arg(long, default_value_t = 300)]
    width: i32,
    #[arg(long, default_value_t = 300)]
    height: i32,
    /// Fraction complete; values outside 0..=1 are clamped.
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    percentage: f64,
    #[arg(long, allow_hyphen_values = true)]
    line_width: Option<i32>,
    #[arg(long, value_enum)]
    line_cap: Option<CapArg>,
    #[arg(long)]
    center_filled: bool,
    #[arg(long)]
    radius_filled: bool,
    #[arg(long)]
    center_color: Option<String>,
    #[arg(long)]
    radius_color: Option<String>,
    #[arg(long)]
    progress_color: Option<String>,
}

impl DialArgs {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    fn build(&self, config: &AppConfig) -> CircularProgressBar {
        let mut bar = CircularProgressBar::new(ProgressState::from_config(&config.progress));
        bar.set_percentage(self.percentage);
        if let Some(width) = self.line_width {
            bar.set_line_width(width);
        }
        if let Some(cap) = self.line_cap {
            bar.set_line_cap(cap.into());
        }
        if self.center_filled {
            bar.set_center_filled(true);
        }
        if self.radius_filled {
            bar.set_radius_filled(true);
        }

        type ColorSetter = fn(&mut CircularProgressBar, &str) -> bool;
        let colors: [(&Option<String>, ColorSetter); 3] = [
            (&self.center_color, CircularProgressBar::set_center_fill_color),
            (&self.radius_color, CircularProgressBar::set_radius_fill_color),
            (&self.progress_color, CircularProgressBar::set_progress_fill_color),
        ];
        for (value, setter) in colors {
            if let Some(value) = value {
                if !setter(&mut bar, value) {
                    tracing::warn!(%value, "ignoring invalid colour");
                }
            }
        }
        bar
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CapArg {
    Butt,
    Round,
}

impl From<CapArg> for LineCap {
    fn from(value: CapArg) -> Self {
        match value {
            CapArg::Butt => LineCap::Butt,
            CapArg::Round => LineCap::Round,
        }
    }
}
