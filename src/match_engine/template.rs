//! Template loading and caching

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{GrayImage, RgbaImage};
use log::{debug, warn};

use super::error::{EngineResult, MatchError};

/// File extension appended to template names that lack one.
const TEMPLATE_EXT: &str = ".png";

/// A reference image for one on-screen UI element.
#[derive(Debug, Clone)]
pub struct Template {
    /// Logical name (file stem, including any family suffix).
    pub name: String,
    pub image: RgbaImage,
    /// Luma rendition, kept alongside the color buffer because multi-target
    /// matching always runs in grayscale.
    pub gray: GrayImage,
    pub width: u32,
    pub height: u32,
}

impl Template {
    fn from_file(path: &Path) -> Option<Self> {
        let dynamic = match image::open(path) {
            Ok(img) => img,
            Err(e) => {
                warn!("[ERROR] failed to decode template {}: {e}", path.display());
                return None;
            }
        };

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let image = dynamic.to_rgba8();
        let gray = dynamic.to_luma8();
        let (width, height) = (image.width(), image.height());

        Some(Self {
            name,
            image,
            gray,
            width,
            height,
        })
    }
}

/// Loads templates from a flat directory and caches them for the process
/// lifetime. Single templates live in `<dir>/<name>.png`; multi-variant
/// families are every `<dir>/<name>_<suffix>.png`, discovered by listing the
/// directory, not by a fixed numeric range.
pub struct TemplateStore {
    dir: PathBuf,
    singles: HashMap<String, Option<Template>>,
    families: HashMap<String, Vec<Template>>,
}

impl TemplateStore {
    /// Open a store over `dir`. The directory must exist; individual
    /// templates are loaded lazily on first use.
    pub fn open(dir: impl Into<PathBuf>) -> EngineResult<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(MatchError::TemplateDirMissing { path: dir });
        }
        Ok(Self {
            dir,
            singles: HashMap::new(),
            families: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a single template by logical name, appending the `.png`
    /// extension if absent. Missing or undecodable files yield `None`;
    /// both outcomes are cached until process restart.
    pub fn load(&mut self, name: &str) -> Option<&Template> {
        if !self.singles.contains_key(name) {
            let file = if name.ends_with(TEMPLATE_EXT) {
                name.to_string()
            } else {
                format!("{name}{TEMPLATE_EXT}")
            };
            let path = self.dir.join(&file);

            let template = if path.is_file() {
                Template::from_file(&path)
            } else {
                warn!("[ERROR] template file not found: {}", path.display());
                None
            };
            self.singles.insert(name.to_string(), template);
        }

        self.singles.get(name).and_then(|t| t.as_ref())
    }

    /// Load the variant family for `prefix`: every `<prefix>_<suffix>.png`
    /// in the template directory, in filename order so enumeration is
    /// deterministic across passes. An empty family is logged, not fatal.
    pub fn load_family(&mut self, prefix: &str) -> &[Template] {
        if !self.families.contains_key(prefix) {
            let variants = self.scan_family(prefix);
            if variants.is_empty() {
                warn!("[ERROR] no template variants found for family: {prefix}_*{TEMPLATE_EXT}");
            } else {
                debug!("loaded {} variant(s) for family '{prefix}'", variants.len());
            }
            self.families.insert(prefix.to_string(), variants);
        }

        self.families
            .get(prefix)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn scan_family(&self, prefix: &str) -> Vec<Template> {
        let marker = format!("{prefix}_");
        let mut paths: Vec<PathBuf> = Vec::new();

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("[ERROR] failed to list template directory {}: {e}", self.dir.display());
                return Vec::new();
            }
        };

        for entry in entries.flatten() {
            if let Some(file_name) = entry.file_name().to_str()
                && file_name.starts_with(&marker)
                && file_name.ends_with(TEMPLATE_EXT)
                && entry.path().is_file()
            {
                paths.push(entry.path());
            }
        }

        // Filename order keeps variant enumeration stable between passes.
        paths.sort();
        paths.iter().filter_map(|p| Template::from_file(p)).collect()
    }
}
