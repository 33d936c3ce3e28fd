use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use nodegraph::{emit_wgsl, GraphDump, Node};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use shadelib::post::apply_chain;
use sketchconfig::{GalleryConfig, ResolvedRender};
use sketches::{SketchEntry, SketchRegistry, DEFAULT_SKETCH};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, FrameArgs, GraphArgs, ListArgs, RandomArgs, RenderArgs, WgslArgs};
use crate::paths::AppPaths;
use crate::render::{render_still, write_png};

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let registry = SketchRegistry::builtin();
    let config = load_config(cli.global.config.as_deref())?;
    match &cli.command {
        Command::List(args) => list(&registry, args),
        Command::Render(args) => render(&registry, &config, args),
        Command::Wgsl(args) => wgsl(&registry, &config, args),
        Command::Graph(args) => graph(&registry, &config, args),
        Command::Random(args) => random(&registry, &config, args),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Loads `explicit`, or the per-user `sketchbook.toml` when present.
fn load_config(explicit: Option<&Path>) -> Result<GalleryConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let paths = AppPaths::discover()?;
            let candidate = paths.config_file();
            if !candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "no gallery config; using defaults");
                return Ok(GalleryConfig::default());
            }
            candidate
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = GalleryConfig::from_toml_str(&raw)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded gallery config");
    Ok(config)
}

#[derive(Serialize)]
struct ListRow<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
}

fn list(registry: &SketchRegistry, args: &ListArgs) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if args.json {
        let rows: Vec<ListRow<'_>> = registry
            .entries()
            .map(|entry| ListRow {
                id: entry.id,
                title: entry.title,
                description: entry.description,
            })
            .collect();
        serde_json::to_writer_pretty(&mut stdout, &rows).context("failed to encode sketch list")?;
        writeln!(stdout)?;
        return Ok(());
    }

    let width = registry.ids().map(str::len).max().unwrap_or(0);
    for entry in registry.entries() {
        writeln!(
            stdout,
            "{:width$}  {} - {}",
            entry.id, entry.title, entry.description
        )?;
    }
    Ok(())
}

/// Layers command-line overrides over the configuration for `sketch`.
fn resolve_frame(
    config: &GalleryConfig,
    entry: &SketchEntry,
    frame: &FrameArgs,
) -> ResolvedRender {
    let mut resolved = config.resolve(Some(entry.id), DEFAULT_SKETCH);
    if let Some(size) = frame.size {
        resolved.size = size;
    }
    if let Some(time) = frame.time {
        resolved.time = time;
    }
    if frame.no_post {
        resolved.post.clear();
    } else if !frame.post.is_empty() {
        resolved.post = frame.post.clone();
    }
    resolved
}

fn lookup<'r>(
    registry: &'r SketchRegistry,
    config: &GalleryConfig,
    requested: Option<&str>,
) -> Result<&'r SketchEntry> {
    let id = requested
        .or(config.default_sketch())
        .unwrap_or(DEFAULT_SKETCH);
    registry.get(id).ok_or_else(|| {
        tracing::warn!(sketch = id, "unknown sketch; nothing rendered");
        let known: Vec<_> = registry.ids().collect();
        anyhow!("unknown sketch '{id}'; known sketches: {}", known.join(", "))
    })
}

fn build_graph(entry: &SketchEntry, resolved: &ResolvedRender) -> Result<Node> {
    let base = entry
        .build()
        .with_context(|| format!("failed to build sketch '{}'", entry.id))?;
    if resolved.post.is_empty() {
        return Ok(base);
    }
    apply_chain(&base, &resolved.post)
        .with_context(|| format!("failed to apply post effects to '{}'", entry.id))
}

fn render_entry(entry: &SketchEntry, resolved: &ResolvedRender, output: &Path) -> Result<()> {
    tracing::info!(
        sketch = entry.id,
        size = %resolved.size,
        time = ?resolved.time,
        post = resolved.post.len(),
        "rendering sketch"
    );
    let graph = build_graph(entry, resolved)?;
    let image = render_still(&graph, resolved.size, resolved.time)?;
    write_png(&image, output)?;
    tracing::info!(path = %output.display(), "wrote still frame");
    Ok(())
}

fn render(registry: &SketchRegistry, config: &GalleryConfig, args: &RenderArgs) -> Result<()> {
    let entry = lookup(registry, config, args.sketch.as_deref())?;
    let resolved = resolve_frame(config, entry, &args.frame);
    render_entry(entry, &resolved, &args.output)
}

fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(stdout)?;
            }
            Ok(())
        }
    }
}

fn wgsl(registry: &SketchRegistry, config: &GalleryConfig, args: &WgslArgs) -> Result<()> {
    let entry = lookup(registry, config, args.sketch.as_deref())?;
    let resolved = resolve_frame(config, entry, &args.frame);
    let graph = build_graph(entry, &resolved)?;
    let module = emit_wgsl(&graph)
        .with_context(|| format!("failed to lower sketch '{}' to WGSL", entry.id))?;
    tracing::debug!(
        sketch = entry.id,
        bytes = module.source.len(),
        textures = module.texture_slots.len(),
        "emitted WGSL"
    );
    write_text(&module.source, args.output.as_deref())
}

fn graph(registry: &SketchRegistry, config: &GalleryConfig, args: &GraphArgs) -> Result<()> {
    let entry = lookup(registry, config, args.sketch.as_deref())?;
    let resolved = resolve_frame(config, entry, &args.frame);
    let graph = build_graph(entry, &resolved)?;
    let dump = GraphDump::from_node(&graph);
    tracing::debug!(sketch = entry.id, nodes = dump.nodes.len(), "dumped graph");
    let json = dump.to_json_pretty().context("failed to encode graph")?;
    write_text(&json, args.output.as_deref())
}

fn random(registry: &SketchRegistry, config: &GalleryConfig, args: &RandomArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let entry = registry
        .choose(&mut rng)
        .ok_or_else(|| anyhow!("no sketches registered"))?;
    tracing::info!(seed, sketch = entry.id, "picked sketch");
    println!("{}", entry.id);

    if let Some(output) = args.output.as_deref() {
        let resolved = resolve_frame(config, entry, &args.frame);
        render_entry(entry, &resolved, output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchconfig::RenderSize;
    use std::time::Duration;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
version = 1

[defaults]
sketch = "genuary-1"
size = "32x16"

[[post]]
effect = "grain"

[sketches.dawn-1]
time = "3s"
"#;

    #[test]
    fn flags_override_config() {
        let config = GalleryConfig::from_toml_str(CONFIG).expect("config");
        let registry = SketchRegistry::builtin();
        let entry = registry.get("dawn-1").expect("registered");

        let from_file = resolve_frame(&config, entry, &FrameArgs::default());
        assert_eq!(from_file.size, RenderSize::new(32, 16));
        assert_eq!(from_file.time, Duration::from_secs(3));
        assert_eq!(from_file.post.len(), 1);

        let flags = FrameArgs {
            size: Some(RenderSize::new(8, 8)),
            time: Some(Duration::from_secs(1)),
            no_post: true,
            ..FrameArgs::default()
        };
        let overridden = resolve_frame(&config, entry, &flags);
        assert_eq!(overridden.size, RenderSize::new(8, 8));
        assert_eq!(overridden.time, Duration::from_secs(1));
        assert!(overridden.post.is_empty());
    }

    #[test]
    fn lookup_falls_back_to_configured_sketch() {
        let config = GalleryConfig::from_toml_str(CONFIG).expect("config");
        let registry = SketchRegistry::builtin();
        let entry = lookup(&registry, &config, None).expect("found");
        assert_eq!(entry.id, "genuary-1");
        assert!(lookup(&registry, &config, Some("nope")).is_err());
    }

    #[test]
    fn post_chain_turns_colour_into_rgba() {
        let registry = SketchRegistry::builtin();
        let entry = registry.get("default").expect("registered");
        let config = GalleryConfig::from_toml_str(CONFIG).expect("config");
        let resolved = resolve_frame(&config, entry, &FrameArgs::default());
        let graph = build_graph(entry, &resolved).expect("builds");
        assert_eq!(graph.ty(), nodegraph::ValueType::Vec4);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(dir.path().join("missing.toml").as_path())).is_err());
    }

    #[test]
    fn explicit_config_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gallery.toml");
        fs::write(&path, CONFIG).unwrap();
        let config = load_config(Some(path.as_path())).expect("loads");
        assert_eq!(config.default_sketch(), Some("genuary-1"));
    }
}
