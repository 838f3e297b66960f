use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use renderer::{RenderPolicy, Renderer, RendererConfig};
use scene::{Demo, Fog, OrbitDemo, OrbitDemoParams, PairStyle, TubeDemo, TubeDemoParams, TubeParams};
use sceneconfig::SceneConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoKind {
    Tube,
    Orbit,
}

impl DemoKind {
    fn label(self) -> &'static str {
        match self {
            DemoKind::Tube => "tube",
            DemoKind::Orbit => "orbit",
        }
    }
}

pub fn run(kind: DemoKind, args: RunArgs) -> Result<()> {
    let mut config = load_config(&args)?;
    apply_overrides(&mut config, &args);
    config
        .validate()
        .context("configuration is invalid after applying command-line overrides")?;

    let demo = build_demo(kind, &config)?;
    let renderer_config = renderer_config(&config, &args);
    tracing::info!(
        demo = kind.label(),
        width = config.window.width,
        height = config.window.height,
        seed = ?config.seed,
        policy = ?renderer_config.policy,
        "starting vibes"
    );

    let mut renderer = Renderer::new(renderer_config);
    renderer.run(demo)
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(args: &RunArgs) -> Result<SceneConfig> {
    if let Some(path) = args.config.as_ref() {
        return read_config(path);
    }

    let paths = AppPaths::discover()?;
    let path = paths.config_file();
    if path.exists() {
        read_config(&path)
    } else {
        tracing::debug!(path = %path.display(), "no config file found; using defaults");
        Ok(SceneConfig::default())
    }
}

fn read_config(path: &Path) -> Result<SceneConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config = SceneConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to load config at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn apply_overrides(config: &mut SceneConfig, args: &RunArgs) {
    if let Some((width, height)) = args.size {
        config.window.width = width;
        config.window.height = height;
    }
    if let Some(fps) = args.fps {
        config.window.fps = fps;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.duration.is_some() {
        config.run_for = args.duration;
    }
}

fn build_demo(kind: DemoKind, config: &SceneConfig) -> Result<Box<dyn Demo>> {
    let demo: Box<dyn Demo> = match kind {
        DemoKind::Tube => Box::new(
            TubeDemo::new(&tube_params(config)).context("failed to build tube demo")?,
        ),
        DemoKind::Orbit => Box::new(
            OrbitDemo::new(&orbit_params(config)).context("failed to build orbit demo")?,
        ),
    };
    Ok(demo)
}

fn tube_params(config: &SceneConfig) -> TubeDemoParams {
    let section = &config.tube;
    let defaults = TubeDemoParams::default();
    TubeDemoParams {
        width: config.window.width,
        height: config.window.height,
        seed: config.seed,
        tube: TubeParams {
            tube_detail: section.tube_detail,
            circle_detail: section.circle_detail,
            radius: section.radius,
            min_radius_factor: section.min_radius_factor,
            cube_size: section.cube_size,
            ..TubeParams::default()
        },
        height_range: section.height_range,
        fov_degrees: section.fov,
        speed: section.speed,
        look_ahead: section.look_ahead,
        far: section.fog_far.max(defaults.far),
        fog: Fog {
            near: section.fog_near,
            far: section.fog_far,
            ..Fog::default()
        },
        ..defaults
    }
}

fn orbit_params(config: &SceneConfig) -> OrbitDemoParams {
    let section = &config.orbit;
    OrbitDemoParams {
        width: config.window.width,
        height: config.window.height,
        seed: config.seed,
        dots: section.dots,
        orbit: section.orbit,
        dot_radius: section.dot_radius,
        velocity: section.velocity,
        hue_step: section.hue_step,
        glow_blur: section.glow_blur,
        trail_alpha: section.trail_alpha,
        pairs: PairStyle {
            jitter: section.jitter,
            bias: section.jitter_bias,
            ..PairStyle::default()
        },
    }
}

fn renderer_config(config: &SceneConfig, args: &RunArgs) -> RendererConfig {
    let policy = match args.export.as_ref() {
        Some(path) => RenderPolicy::Export {
            path: path.clone(),
            frames: args.frames,
        },
        None => RenderPolicy::Animate {
            target_fps: (config.window.fps > 0.0).then_some(config.window.fps),
        },
    };
    RendererConfig {
        surface_size: (config.window.width, config.window.height),
        title: config.window.title.clone(),
        policy,
        run_for: config.run_for,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn cli_overrides_file_values() {
        let mut config = SceneConfig::default();
        config.seed = Some(1);
        let args = RunArgs {
            size: Some((64, 48)),
            fps: Some(24.0),
            seed: Some(9),
            duration: Some(Duration::from_secs(5)),
            ..RunArgs::default()
        };

        apply_overrides(&mut config, &args);

        assert_eq!((config.window.width, config.window.height), (64, 48));
        assert_eq!(config.window.fps, 24.0);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.run_for, Some(Duration::from_secs(5)));
    }

    #[test]
    fn missing_flags_keep_file_values() {
        let mut config = SceneConfig::default();
        config.seed = Some(3);
        apply_overrides(&mut config, &RunArgs::default());
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn sections_map_onto_demo_params() {
        let mut config = SceneConfig::default();
        config.seed = Some(11);
        config.tube.tube_detail = 40;
        config.tube.fog_far = 200.0;
        config.orbit.dots = 3;
        config.orbit.jitter_bias = 5.0;

        let tube = tube_params(&config);
        assert_eq!(tube.tube.tube_detail, 40);
        assert_eq!(tube.seed, Some(11));
        assert_eq!(tube.fog.far, 200.0);
        assert_eq!(tube.far, 200.0);

        let orbit = orbit_params(&config);
        assert_eq!(orbit.dots, 3);
        assert_eq!(orbit.pairs.bias, 5.0);
        assert!(orbit.pairs.glow.is_some());
    }

    #[test]
    fn export_flag_selects_export_policy() {
        let config = SceneConfig::default();
        let args = RunArgs {
            export: Some(PathBuf::from("frame.png")),
            frames: 5,
            ..RunArgs::default()
        };
        assert_eq!(
            renderer_config(&config, &args).policy,
            RenderPolicy::Export {
                path: PathBuf::from("frame.png"),
                frames: 5
            }
        );
    }

    #[test]
    fn zero_fps_is_uncapped() {
        let config = SceneConfig::default();
        assert_eq!(
            renderer_config(&config, &RunArgs::default()).policy,
            RenderPolicy::Animate { target_fps: None }
        );
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "version = 1\nseed = 42\n[orbit]\ndots = 4\n").unwrap();
        let args = RunArgs {
            config: Some(path),
            ..RunArgs::default()
        };

        let config = load_config(&args).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.orbit.dots, 4);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            config: Some(dir.path().join("absent.toml")),
            ..RunArgs::default()
        };
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn builds_both_demos_from_defaults() {
        let mut config = SceneConfig::default();
        config.seed = Some(2);
        config.tube.tube_detail = 20;
        assert_eq!(build_demo(DemoKind::Tube, &config).unwrap().name(), "tube");
        assert_eq!(build_demo(DemoKind::Orbit, &config).unwrap().name(), "orbit");
    }
}
