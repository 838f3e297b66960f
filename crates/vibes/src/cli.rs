use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "vibes",
    author,
    version,
    about = "Procedural animation demos rendered in a window or to PNG"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fly a camera through a noise-colored tube of cubes.
    Tube(RunArgs),
    /// Glowing orbiting dots joined by jittered gradient strokes.
    Orbit(RunArgs),
    /// Inspect configuration locations.
    Config(ConfigCommand),
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the render resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap for the window (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Seed every random choice for a reproducible run.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Read settings from this TOML file instead of the discovered config.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Render headless and write the final frame to this PNG, then exit.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Ticks to run before the export is captured.
    #[arg(long, value_name = "N", default_value_t = 1, requires = "export")]
    pub frames: u64,

    /// Close the window after this long (e.g. `10s`, `2m`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config directory and file.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}' in size", width.trim()))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}' in size", height.trim()))?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds.is_finite() && seconds >= 0.0 {
            return Ok(Duration::from_secs_f64(seconds));
        }
        return Err(format!("duration must be non-negative, got {trimmed}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_surface_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_surface_size(" 64 X 48 "), Ok((64, 48)));
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("0x720").is_err());
        assert!(parse_surface_size("widex720").is_err());
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("1m 30s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration("2.5"), Ok(Duration::from_millis(2500)));
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn export_flags_parse() {
        let cli = Cli::try_parse_from([
            "vibes", "orbit", "--export", "out.png", "--frames", "3", "--size", "64x48", "--seed",
            "7",
        ])
        .unwrap();
        let Command::Orbit(args) = cli.command else {
            panic!("expected orbit command");
        };
        assert_eq!(args.export, Some(PathBuf::from("out.png")));
        assert_eq!(args.frames, 3);
        assert_eq!(args.size, Some((64, 48)));
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn frames_require_export() {
        assert!(Cli::try_parse_from(["vibes", "tube", "--frames", "3"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
