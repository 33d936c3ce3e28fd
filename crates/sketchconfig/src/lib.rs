//! Gallery configuration (`sketchbook.toml`).
//!
//! ```toml
//! version = 1
//!
//! [defaults]
//! sketch = "dawn-1"
//! size = "1280x720"
//! time = "2.5s"
//!
//! [[post]]
//! effect = "vignette"
//! exponent = 2.0
//!
//! [sketches.mesh-1]
//! time = "40s"
//! post = [{ effect = "grain", intensity = 0.05 }]
//! ```
//!
//! Durations accept humantime strings or plain seconds. A per-sketch `post`
//! list replaces the global chain rather than extending it.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use shadelib::post::PostEffect;
use sketches::canonical_id;

/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 16_384;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

impl RenderSize {
    pub const DEFAULT: RenderSize = RenderSize {
        width: 640,
        height: 360,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    fn check(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("size {self} must be non-zero"));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(format!("size {self} exceeds {MAX_DIMENSION} per side"));
        }
        Ok(())
    }
}

impl Default for RenderSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for RenderSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for RenderSize {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        let (w, h) = normalized
            .split_once('x')
            .ok_or_else(|| format!("invalid size '{raw}'; expected WIDTHxHEIGHT"))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid width in '{raw}': {err}"))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid height in '{raw}': {err}"))?;
        let size = RenderSize::new(width, height);
        size.check()?;
        Ok(size)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryConfig {
    pub version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub post: Vec<PostEffect>,
    #[serde(default)]
    pub sketches: BTreeMap<String, SketchOverride>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Defaults {
    pub sketch: Option<String>,
    #[serde(default, deserialize_with = "deserialize_size_opt")]
    pub size: Option<RenderSize>,
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub time: Option<Duration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SketchOverride {
    #[serde(default, deserialize_with = "deserialize_size_opt")]
    pub size: Option<RenderSize>,
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub time: Option<Duration>,
    #[serde(default)]
    pub post: Option<Vec<PostEffect>>,
}

/// Settings for one still frame after layering overrides over defaults.
#[derive(Debug, Clone)]
pub struct ResolvedRender {
    pub sketch: String,
    pub size: RenderSize,
    pub time: Duration,
    pub post: Vec<PostEffect>,
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
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("duration {v} is out of range: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_size_opt<'de, D>(deserializer: D) -> Result<Option<RenderSize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Pair([u32; 2]),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let size = match helper {
        None => return Ok(None),
        Some(Helper::Str(raw)) => raw.parse::<RenderSize>().map_err(de::Error::custom)?,
        Some(Helper::Pair([width, height])) => {
            let size = RenderSize::new(width, height);
            size.check().map_err(de::Error::custom)?;
            size
        }
    };
    Ok(Some(size))
}

impl GalleryConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: GalleryConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn default_sketch(&self) -> Option<&str> {
        self.defaults.sketch.as_deref()
    }

    /// Finds the `[sketches.<id>]` table for `id`, matching keys the same
    /// loose way the registry matches ids (`dawn1` and `Dawn_1` both name
    /// `dawn-1`).
    pub fn sketch_override(&self, id: &str) -> Option<&SketchOverride> {
        if let Some(exact) = self.sketches.get(id) {
            return Some(exact);
        }
        let wanted = canonical_id(id);
        self.sketches
            .iter()
            .find(|(key, _)| canonical_id(key) == wanted)
            .map(|(_, sketch)| sketch)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if let Some(sketch) = &self.defaults.sketch {
            if sketch.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "defaults.sketch may not be empty".into(),
                ));
            }
        }

        let mut seen = BTreeMap::new();
        for id in self.sketches.keys() {
            let canonical = canonical_id(id);
            if canonical.is_empty() {
                return Err(ConfigError::Invalid(
                    "sketch override key may not be empty".into(),
                ));
            }
            if let Some(previous) = seen.insert(canonical, id) {
                return Err(ConfigError::Invalid(format!(
                    "sketch overrides '{previous}' and '{id}' name the same sketch"
                )));
            }
        }

        Ok(())
    }

    /// Layers the override for `sketch` over `[defaults]` and the global
    /// `[[post]]` chain. `sketch` falls back to `defaults.sketch`, then to
    /// `fallback`.
    pub fn resolve(&self, sketch: Option<&str>, fallback: &str) -> ResolvedRender {
        let sketch = sketch
            .or(self.defaults.sketch.as_deref())
            .unwrap_or(fallback)
            .to_string();
        let overrides = self.sketch_override(&sketch);

        let size = overrides
            .and_then(|o| o.size)
            .or(self.defaults.size)
            .unwrap_or_default();
        let time = overrides
            .and_then(|o| o.time)
            .or(self.defaults.time)
            .unwrap_or(Duration::ZERO);
        let post = overrides
            .and_then(|o| o.post.clone())
            .unwrap_or_else(|| self.post.clone());

        ResolvedRender {
            sketch,
            size,
            time,
            post,
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            version: 1,
            defaults: Defaults::default(),
            post: Vec::new(),
            sketches: BTreeMap::new(),
        }
    }
}
