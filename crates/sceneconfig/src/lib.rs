use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Serializer;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SceneConfig {
    pub version: u32,
    /// Seed for every random choice; entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Stops the window after this long; runs until closed when unset.
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub run_for: Option<Duration>,
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub tube: TubeSection,
    #[serde(default)]
    pub orbit: OrbitSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    /// Frame cap; `0` renders as fast as the display allows.
    pub fps: f32,
    pub title: String,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 0.0,
            title: "vibes".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TubeSection {
    pub tube_detail: usize,
    pub circle_detail: usize,
    pub radius: f32,
    pub min_radius_factor: f32,
    pub cube_size: f32,
    pub height_range: f32,
    pub speed: f32,
    pub look_ahead: f32,
    pub fov: f32,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl Default for TubeSection {
    fn default() -> Self {
        Self {
            tube_detail: 500,
            circle_detail: 10,
            radius: 8.0,
            min_radius_factor: 0.8,
            cube_size: 4.0,
            height_range: 100.0,
            speed: 0.0005,
            look_ahead: 0.01,
            fov: 45.0,
            fog_near: 30.0,
            fog_far: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrbitSection {
    pub dots: usize,
    pub orbit: f32,
    pub dot_radius: f32,
    pub velocity: f32,
    pub hue_step: f32,
    pub glow_blur: f32,
    pub trail_alpha: f32,
    pub jitter: f32,
    pub jitter_bias: f32,
}

impl Default for OrbitSection {
    fn default() -> Self {
        Self {
            dots: 6,
            orbit: 200.0,
            dot_radius: 1.0,
            velocity: 0.08,
            hue_step: 0.5,
            glow_blur: 25.0,
            trail_alpha: 0.3,
            jitter: 20.0,
            jitter_bias: 12.0,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: 1,
            seed: None,
            run_for: None,
            window: WindowSection::default(),
            tube: TubeSection::default(),
            orbit: OrbitSection::default(),
        }
    }
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be finite and non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration_opt<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => serializer.serialize_str(&humantime::format_duration(*duration).to_string()),
        None => serializer.serialize_none(),
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be > 0")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be >= 0")))
    }
}

impl SceneConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if let Some(run_for) = self.run_for {
            if run_for.is_zero() {
                return Err(ConfigError::Invalid(
                    "run_for must be greater than zero".into(),
                ));
            }
        }

        let window = &self.window;
        if window.width == 0 || window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} has no area",
                window.width, window.height
            )));
        }
        non_negative("window.fps", window.fps)?;

        let tube = &self.tube;
        if tube.tube_detail == 0 {
            return Err(ConfigError::Invalid("tube.tube_detail must be >= 1".into()));
        }
        if tube.circle_detail == 0 {
            return Err(ConfigError::Invalid(
                "tube.circle_detail must be >= 1".into(),
            ));
        }
        positive("tube.radius", tube.radius)?;
        if !(0.0..=1.0).contains(&tube.min_radius_factor) {
            return Err(ConfigError::Invalid(
                "tube.min_radius_factor must lie within [0, 1]".into(),
            ));
        }
        positive("tube.cube_size", tube.cube_size)?;
        non_negative("tube.height_range", tube.height_range)?;
        non_negative("tube.speed", tube.speed)?;
        non_negative("tube.look_ahead", tube.look_ahead)?;
        if !(tube.fov > 0.0 && tube.fov < 180.0) {
            return Err(ConfigError::Invalid(
                "tube.fov must lie within (0, 180) degrees".into(),
            ));
        }
        non_negative("tube.fog_near", tube.fog_near)?;
        if !(tube.fog_far > tube.fog_near) {
            return Err(ConfigError::Invalid(
                "tube.fog_far must be greater than tube.fog_near".into(),
            ));
        }

        let orbit = &self.orbit;
        non_negative("orbit.orbit", orbit.orbit)?;
        positive("orbit.dot_radius", orbit.dot_radius)?;
        if !orbit.velocity.is_finite() || !orbit.hue_step.is_finite() {
            return Err(ConfigError::Invalid(
                "orbit.velocity and orbit.hue_step must be finite".into(),
            ));
        }
        non_negative("orbit.glow_blur", orbit.glow_blur)?;
        if !(0.0..=1.0).contains(&orbit.trail_alpha) {
            return Err(ConfigError::Invalid(
                "orbit.trail_alpha must lie within [0, 1]".into(),
            ));
        }
        non_negative("orbit.jitter", orbit.jitter)?;
        if !orbit.jitter_bias.is_finite() {
            return Err(ConfigError::Invalid(
                "orbit.jitter_bias must be finite".into(),
            ));
        }

        Ok(())
    }

    /// Renders the config as TOML, e.g. to seed a fresh config file.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
