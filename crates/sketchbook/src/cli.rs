use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use shadelib::post::PostEffect;
use sketchconfig::RenderSize;

#[derive(Parser, Debug)]
#[command(
    name = "sketchbook",
    author,
    version,
    about = "Gallery of procedural shader sketches",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Gallery configuration file; defaults to `sketchbook.toml` in the config directory.
    #[arg(long, global = true, value_name = "PATH", env = "SKETCHBOOK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the built-in sketches.
    List(ListArgs),
    /// Render one still frame to a PNG file on the CPU.
    Render(RenderArgs),
    /// Print the WGSL module for a sketch.
    Wgsl(WgslArgs),
    /// Dump a sketch graph as JSON.
    Graph(GraphArgs),
    /// Pick a sketch at random, optionally rendering it.
    Random(RandomArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Overrides shared by every command that builds a frame.
#[derive(Args, Debug, Default)]
pub struct FrameArgs {
    /// Output resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<RenderSize>,

    /// Elapsed time seen by the sketch (e.g. `2.5s`, `1m`, or plain seconds).
    #[arg(long, value_name = "DURATION", value_parser = parse_time)]
    pub time: Option<Duration>,

    /// Comma-separated post effects with default settings (e.g. `dither,vignette`).
    #[arg(
        long,
        value_name = "EFFECTS",
        value_delimiter = ',',
        value_parser = parse_post_effect,
        conflicts_with = "no_post"
    )]
    pub post: Vec<PostEffect>,

    /// Ignore post effects from the configuration file.
    #[arg(long)]
    pub no_post: bool,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Sketch id (see `sketchbook list`); defaults to the configured sketch.
    #[arg(value_name = "SKETCH")]
    pub sketch: Option<String>,

    /// PNG file to write.
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct WgslArgs {
    #[arg(value_name = "SKETCH")]
    pub sketch: Option<String>,

    /// Write the module to a file instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct GraphArgs {
    #[arg(value_name = "SKETCH")]
    pub sketch: Option<String>,

    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct RandomArgs {
    /// Seed for a reproducible pick.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Render the picked sketch to this PNG file.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub frame: FrameArgs,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<RenderSize, String> {
    if value.trim().is_empty() {
        return Err("size must not be empty".to_string());
    }
    value.parse()
}

pub fn parse_time(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time must not be empty".to_string());
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds.is_sign_negative() {
            return Err(format!("time '{trimmed}' must be finite and non-negative"));
        }
        return Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("time '{trimmed}' is out of range: {err}"));
    }

    humantime::parse_duration(trimmed).map_err(|err| format!("invalid time '{trimmed}': {err}"))
}

pub fn parse_post_effect(value: &str) -> Result<PostEffect, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("post effect name must not be empty".to_string());
    }

    PostEffect::from_name(trimmed).ok_or_else(|| {
        format!(
            "unknown post effect '{trimmed}'; expected one of {}",
            PostEffect::NAMES.join(", ")
        )
    })
}
