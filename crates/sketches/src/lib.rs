//! Built-in sketches and the registry that resolves them by id.
//!
//! A sketch is a plain constructor returning a vec3 colour graph over the
//! screen UV, elapsed time and resolution. Graphs are only built when an
//! entry's `build` is invoked.
//!
//! Lookups accept ids loosely: case and punctuation are ignored, so
//! `Dawn_1`, `dawn1` and `sketch://dawn-1` all name `dawn-1`.
use nodegraph::{GraphError, Node};
use rand::Rng;
use shadelib::math::scalar::random_from_array;
use tracing::debug;

mod dawn;
mod flare;
mod genuary;
mod mesh;
mod template;

pub use dawn::dawn1;
pub use flare::flare1;
pub use genuary::{genuary1, genuary30};
pub use mesh::{mesh1, mesh1_with, Mesh1Params};
pub use template::template;

pub const DEFAULT_SKETCH: &str = "default";

/// One sketch the gallery can show.
#[derive(Debug, Clone, Copy)]
pub struct SketchEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub build: fn() -> Result<Node, GraphError>,
}

impl SketchEntry {
    pub fn build(&self) -> Result<Node, GraphError> {
        debug!(sketch = self.id, "building sketch graph");
        (self.build)()
    }
}

#[derive(Debug, Clone)]
pub struct SketchRegistry {
    entries: Vec<SketchEntry>,
}

impl SketchRegistry {
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                SketchEntry {
                    id: DEFAULT_SKETCH,
                    title: "Template",
                    description: "Screen UV with a pulsing blue channel",
                    build: template,
                },
                SketchEntry {
                    id: "dawn-1",
                    title: "Dawn 1",
                    description: "Gradient tribute to Rik Oostenbroek",
                    build: dawn1,
                },
                SketchEntry {
                    id: "flare-1",
                    title: "Flare 1",
                    description: "Gradient with fractionated coordinates",
                    build: flare1,
                },
                SketchEntry {
                    id: "mesh-1",
                    title: "Mesh 1",
                    description: "Mesh gradient warped by ripple, turbulence and vortex",
                    build: mesh1,
                },
                SketchEntry {
                    id: "genuary-1",
                    title: "Genuary 1",
                    description: "Vertical or horizontal lines only",
                    build: genuary1,
                },
                SketchEntry {
                    id: "genuary-30",
                    title: "Genuary 30",
                    description: "Abstract map",
                    build: genuary30,
                },
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&SketchEntry> {
        let wanted = canonical_id(id);
        if wanted.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| canonical_id(entry.id) == wanted)
    }

    pub fn entries(&self) -> impl Iterator<Item = &SketchEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    /// A uniformly chosen sketch, the template excluded.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&SketchEntry> {
        let candidates: Vec<&SketchEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.id != DEFAULT_SKETCH)
            .collect();
        random_from_array(rng, &candidates).copied()
    }
}

impl Default for SketchRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Folds a sketch id to the form lookups compare on: lowercase ASCII
/// alphanumerics with any `sketch://` prefix removed.
pub fn canonical_id(input: &str) -> String {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("sketch://").unwrap_or(trimmed);
    trimmed
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
