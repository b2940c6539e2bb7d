use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Arborescence des dossiers de travail.
///
/// Construite une fois au démarrage puis passée explicitement aux opérations
/// de lecture/écriture. Aucun dossier n'est créé tant que
/// [`Paths::ensure_dirs`] n'est pas appelé.
///
/// # Example
/// ```
/// use gv_core::paths::Paths;
/// use std::path::Path;
/// let paths = Paths::from_root(Path::new("/tmp/gridvid"));
/// assert!(paths.temp_videos.ends_with(".temporary files"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paths {
    /// Racine (`~/Videos/Gridvid` par défaut).
    pub root: PathBuf,
    /// Vidéos d'entrée de l'utilisateur.
    pub input_videos: PathBuf,
    /// Vidéos finies, avec grille.
    pub output_videos: PathBuf,
    /// Images extraites.
    pub image_output: PathBuf,
    /// Fichiers temporaires, vidés par [`Paths::clear_temporary_files`].
    pub temp_videos: PathBuf,
}

impl Paths {
    /// Dispose l'arborescence sous `root`.
    #[must_use]
    pub fn from_root(root: &Path) -> Self {
        let inputs = root.join("Program Input");
        let outputs = root.join("Program Output");
        Self {
            root: root.to_path_buf(),
            input_videos: inputs.join("Videos"),
            output_videos: outputs.join("Videos"),
            image_output: outputs.join("Images"),
            temp_videos: outputs.join(".temporary files"),
        }
    }

    /// Racine par défaut : `$HOME/Videos/Gridvid`, ou `./Gridvid` sans `HOME`.
    #[must_use]
    pub fn default_root() -> PathBuf {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map_or_else(|| PathBuf::from("Gridvid"), |home| {
                PathBuf::from(home).join("Videos").join("Gridvid")
            })
    }

    /// Crée tous les dossiers manquants.
    ///
    /// # Errors
    /// Retourne une erreur si un dossier ne peut être créé.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.root,
            &self.input_videos,
            &self.output_videos,
            &self.image_output,
            &self.temp_videos,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Impossible de créer {}", dir.display()))?;
        }
        log::debug!("Dossiers prêts sous {}", self.root.display());
        Ok(())
    }

    /// Supprime les fichiers directement sous le dossier temporaire (non récursif).
    ///
    /// Les sous-dossiers sont ignorés. Retourne le nombre de fichiers supprimés.
    ///
    /// # Errors
    /// Retourne une erreur si le dossier ne peut être lu ou un fichier supprimé.
    pub fn clear_temporary_files(&self) -> Result<usize> {
        if !self.temp_videos.is_dir() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&self.temp_videos)
            .with_context(|| format!("Impossible de lire {}", self.temp_videos.display()))?
        {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(&path)
                    .with_context(|| format!("Impossible de supprimer {}", path.display()))?;
                removed += 1;
            }
        }
        log::info!(
            "{removed} fichier(s) temporaire(s) supprimé(s) dans {}",
            self.temp_videos.display()
        );
        Ok(removed)
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::from_root(&Self::default_root())
    }
}
