use std::path::PathBuf;

use clap::Parser;
use gv_core::LineColor;

/// Gridvid : superpose une grille de lignes sur chaque frame d'une vidéo.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Vidéo source (MP4, MOV, AVI, MKV, WEBM). Cherchée aussi dans le dossier d'entrée.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Source synthétique : nombre de frames de bruit aléatoire.
    #[arg(long)]
    pub noise: Option<usize>,

    /// Dimensions du bruit, HAUTEURxLARGEUR.
    #[arg(long, default_value = "240x320", value_parser = parse_size)]
    pub size: (usize, usize),

    /// Bruit en niveaux de gris.
    #[arg(long, default_value_t = false)]
    pub grayscale: bool,

    /// Lignes horizontales intérieures (hors bords).
    #[arg(long)]
    pub rows: Option<u32>,

    /// Lignes verticales intérieures (hors bords).
    #[arg(long)]
    pub cols: Option<u32>,

    /// Épaisseur des lignes en pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Couleur des lignes : "r,g,b".
    #[arg(long)]
    pub color: Option<LineColor>,

    /// Nom du fichier de sortie, sans extension.
    #[arg(long)]
    pub output: Option<String>,

    /// FPS de sortie (défaut : FPS source).
    #[arg(long)]
    pub fps: Option<u32>,

    /// Extension de sortie, ex. ".mkv" (défaut : extension source).
    #[arg(long)]
    pub extension: Option<String>,

    /// Exporter aussi cette frame en image (négatif = depuis la fin).
    #[arg(long, allow_hyphen_values = true)]
    pub save_frame: Option<isize>,

    /// Ne pas encoder la vidéo de sortie.
    #[arg(long, default_value_t = false)]
    pub no_save: bool,

    /// Exécuter le test de bout en bout (bruit → grille → export → relecture).
    #[arg(long, default_value_t = false)]
    pub selftest: bool,

    /// Vider le dossier temporaire puis quitter.
    #[arg(long, default_value_t = false)]
    pub clean_temp: bool,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Parse "HxW" (ex. "240x320").
fn parse_size(s: &str) -> Result<(usize, usize), String> {
    let (h, w) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("format attendu HAUTEURxLARGEUR, reçu `{s}`"))?;
    let h: usize = h.trim().parse().map_err(|_| format!("hauteur invalide : `{h}`"))?;
    let w: usize = w.trim().parse().map_err(|_| format!("largeur invalide : `{w}`"))?;
    if h == 0 || w == 0 {
        return Err(format!("dimensions nulles : `{s}`"));
    }
    Ok((h, w))
}

impl Cli {
    /// Validate that exactly one video source is provided.
    ///
    /// `--selftest` et `--clean-temp` n'en demandent aucune.
    ///
    /// # Errors
    /// Returns an error if zero or more than one source is specified.
    pub fn validate_source(&self) -> anyhow::Result<()> {
        if self.selftest || self.clean_temp {
            return Ok(());
        }
        let count = usize::from(self.input.is_some()) + usize::from(self.noise.is_some());

        if count == 0 {
            anyhow::bail!("Aucune source vidéo spécifiée. Utilisez --input ou --noise.");
        }
        if count > 1 {
            anyhow::bail!("Une seule source vidéo à la fois. Spécifiez --input OU --noise.");
        }
        Ok(())
    }
}
