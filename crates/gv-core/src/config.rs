use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::LineColor;
use crate::paths::Paths;

/// Configuration de l'application.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use gv_core::config::GridvidConfig;
/// let config = GridvidConfig::default();
/// assert_eq!(config.default_fps, 30);
/// assert_eq!(config.default_width, 1);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GridvidConfig {
    // === Dossiers ===
    /// Racine des dossiers de travail. `None` = `~/Videos/Gridvid`.
    pub data_root: Option<PathBuf>,
    /// Vider le dossier temporaire à la sortie du programme.
    pub temp_cleanup_on_exit: bool,

    // === Grille ===
    /// Lignes horizontales intérieures (hors bords).
    pub default_rows: u32,
    /// Lignes verticales intérieures (hors bords).
    pub default_cols: u32,
    /// Épaisseur des lignes en pixels.
    pub default_width: u32,
    /// Couleur des lignes.
    pub default_color: LineColor,

    // === Vidéo ===
    /// FPS des vidéos synthétiques.
    pub default_fps: u32,
    /// Extension des images exportées.
    pub image_extension: String,
}

impl Default for GridvidConfig {
    fn default() -> Self {
        Self {
            data_root: None,
            temp_cleanup_on_exit: false,
            default_rows: 5,
            default_cols: 5,
            default_width: 1,
            default_color: LineColor::WHITE,
            default_fps: 30,
            image_extension: ".png".to_string(),
        }
    }
}

impl GridvidConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.default_width = self.default_width.max(1);
        self.default_fps = self.default_fps.clamp(1, 240);
        if !self.image_extension.starts_with('.') {
            self.image_extension.insert(0, '.');
        }
    }

    /// Arborescence dérivée de `data_root`.
    #[must_use]
    pub fn paths(&self) -> Paths {
        self.data_root
            .as_deref()
            .map_or_else(Paths::default, Paths::from_root)
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    paths: Option<PathsSection>,
    grid: Option<GridSection>,
    video: Option<VideoSection>,
}

#[derive(Deserialize)]
struct PathsSection {
    root: Option<PathBuf>,
    clear_temp_on_exit: Option<bool>,
}

#[derive(Deserialize)]
struct GridSection {
    rows: Option<u32>,
    cols: Option<u32>,
    width: Option<u32>,
    color: Option<LineColor>,
}

#[derive(Deserialize)]
struct VideoSection {
    fps: Option<u32>,
    image_extension: Option<String>,
}

/// Parse un document TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the document is not valid TOML or a value has the wrong type.
///
/// # Example
/// ```
/// use gv_core::config::parse_config;
/// let config = parse_config("[grid]\nrows = 3\ncolor = [255, 0, 0]\n").unwrap();
/// assert_eq!(config.default_rows, 3);
/// assert_eq!(config.default_cols, 5);
/// ```
pub fn parse_config(content: &str) -> Result<GridvidConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = GridvidConfig::default();

    if let Some(p) = file.paths {
        if let Some(v) = p.root {
            config.data_root = Some(v);
        }
        if let Some(v) = p.clear_temp_on_exit {
            config.temp_cleanup_on_exit = v;
        }
    }

    if let Some(g) = file.grid {
        if let Some(v) = g.rows {
            config.default_rows = v;
        }
        if let Some(v) = g.cols {
            config.default_cols = v;
        }
        if let Some(v) = g.width {
            config.default_width = v;
        }
        if let Some(v) = g.color {
            config.default_color = v;
        }
    }

    if let Some(v) = file.video {
        if let Some(fps) = v.fps {
            config.default_fps = fps;
        }
        if let Some(ext) = v.image_extension {
            config.image_extension = ext;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use gv_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<GridvidConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Configuration invalide : {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), GridvidConfig::default());
    }

    #[test]
    fn sections_override_and_clamp() {
        let toml = r#"
[paths]
root = "/data/gridvid"
clear_temp_on_exit = true

[grid]
rows = 2
cols = 9
width = 0
color = [0, 255, 0]

[video]
fps = 10000
image_extension = "jpg"
"#;
        let c = parse_config(toml).unwrap();
        assert_eq!(c.data_root, Some(PathBuf::from("/data/gridvid")));
        assert!(c.temp_cleanup_on_exit);
        assert_eq!((c.default_rows, c.default_cols), (2, 9));
        assert_eq!(c.default_width, 1);
        assert_eq!(c.default_color, LineColor::new(0, 255, 0));
        assert_eq!(c.default_fps, 240);
        assert_eq!(c.image_extension, ".jpg");
        assert_eq!(c.paths().root, PathBuf::from("/data/gridvid"));
    }

    #[test]
    fn out_of_range_color_is_rejected() {
        assert!(parse_config("[grid]\ncolor = [256, 0, 0]\n").is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gridvid.toml");
        std::fs::write(&path, "[grid]\nwidth = 3\n").unwrap();
        assert_eq!(load_config(&path).unwrap().default_width, 3);
        assert!(load_config(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn shipped_default_matches_defaults() {
        let c = parse_config(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(c, GridvidConfig::default());
    }
}
