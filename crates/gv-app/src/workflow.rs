use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gv_core::{GridvidConfig, Paths, VideoBuffer};
use gv_export::{FrameOptions, SaveOptions, save_frame, save_video};
use gv_grid::{GridExt, GridSpec};
use gv_source::{NoiseParams, load_video, noise_video};

use crate::cli::Cli;

/// Fichiers écrits par une exécution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outputs {
    pub video: Option<PathBuf>,
    pub frame: Option<PathBuf>,
}

/// Grille demandée : flags CLI, sinon valeurs de la config.
#[must_use]
pub fn grid_spec(cli: &Cli, config: &GridvidConfig) -> GridSpec {
    GridSpec::new(
        cli.rows.unwrap_or(config.default_rows),
        cli.cols.unwrap_or(config.default_cols),
    )
    .with_width(cli.width.unwrap_or(config.default_width))
    .with_color(cli.color.unwrap_or(config.default_color))
}

fn dotted(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

/// Sépare `input` en (dossier, nom de fichier).
///
/// Un chemin introuvable tel quel est cherché dans [`Paths::input_videos`].
///
/// # Errors
/// Chemin non-UTF8.
pub fn resolve_input(input: &Path, paths: &Paths) -> Result<(PathBuf, String)> {
    if input.is_file() {
        let directory = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let filename = input
            .file_name()
            .and_then(|n| n.to_str())
            .context("Nom de fichier invalide (non-UTF8)")?;
        return Ok((directory, filename.to_string()));
    }
    let filename = input.to_str().context("Chemin vidéo invalide (non-UTF8)")?;
    log::debug!(
        "{} introuvable, recherche dans {}",
        input.display(),
        paths.input_videos.display()
    );
    Ok((paths.input_videos.clone(), filename.to_string()))
}

/// Charge la vidéo source : fichier (`--input`) ou bruit (`--noise`).
///
/// # Errors
/// Aucune source, ou erreur de chargement.
pub fn load_source(cli: &Cli, config: &GridvidConfig, paths: &Paths) -> Result<VideoBuffer> {
    if let Some(ref input) = cli.input {
        let (directory, filename) = resolve_input(input, paths)?;
        return load_video(&filename, &directory);
    }
    if let Some(frames) = cli.noise {
        let params = NoiseParams::new(frames, cli.size, config.default_fps).grayscale(cli.grayscale);
        return Ok(noise_video(&params)?);
    }
    anyhow::bail!("Aucune source vidéo spécifiée. Utilisez --input ou --noise.")
}

/// Charge la source, applique la grille, puis exporte.
///
/// # Errors
/// Toute erreur de chargement, de grille ou d'export.
pub fn run_grid(cli: &Cli, config: &GridvidConfig, paths: &Paths) -> Result<Outputs> {
    let mut video = load_source(cli, config, paths)?;
    let spec = grid_spec(cli, config);
    video.create_grid(&spec)?;

    let mut outputs = Outputs::default();
    if let Some(index) = cli.save_frame {
        let options = FrameOptions {
            extension: Some(config.image_extension.clone()),
            ..Default::default()
        };
        outputs.frame = Some(save_frame(&video, index, &options, paths)?);
    }
    if cli.no_save {
        log::info!("--no-save : vidéo non encodée");
    } else {
        let options = SaveOptions {
            filename: cli.output.clone(),
            fps: cli.fps,
            extension: cli.extension.as_deref().map(dotted),
            directory: None,
        };
        outputs.video = Some(save_video(&video, &options, paths)?);
    }
    Ok(outputs)
}

/// Test de bout en bout : bruit → grille → image → vidéo temporaire → relecture.
///
/// Les fichiers temporaires sont supprimés à la fin, même après un échec de relecture.
///
/// # Errors
/// Première étape en échec (ffmpeg absent compris).
pub fn run_selftest(config: &GridvidConfig, paths: &Paths) -> Result<Outputs> {
    let params = NoiseParams::new(10, (64, 64), config.default_fps)
        .grayscale(true)
        .named("selftest");
    let mut video = noise_video(&params)?;
    video.create_grid(&GridSpec::new(4, 4))?;
    log::info!("selftest: grille appliquée sur {} frames", video.len());

    let frame = save_frame(
        &video,
        5,
        &FrameOptions {
            extension: Some(config.image_extension.clone()),
            ..Default::default()
        },
        paths,
    )?;

    let saved = save_video(
        &video,
        &SaveOptions {
            directory: Some(paths.temp_videos.clone()),
            ..Default::default()
        },
        paths,
    )?;

    let reloaded = saved
        .file_name()
        .and_then(|n| n.to_str())
        .context("Nom de fichier temporaire invalide")
        .and_then(|name| load_video(name, &paths.temp_videos));
    let cleared = paths.clear_temporary_files();

    let reloaded = reloaded?;
    cleared?;
    if (reloaded.height(), reloaded.width()) != (video.height(), video.width()) {
        anyhow::bail!(
            "selftest: dimensions relues {}x{}, attendues {}x{}",
            reloaded.width(),
            reloaded.height(),
            video.width(),
            video.height()
        );
    }
    log::info!("selftest: {} frames relues", reloaded.len());

    Ok(Outputs {
        video: None,
        frame: Some(frame),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gv_core::LineColor;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gridvid").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn grid_spec_prefers_flags_over_config() {
        let config = GridvidConfig {
            default_rows: 2,
            default_width: 4,
            default_color: LineColor::new(1, 2, 3),
            ..Default::default()
        };
        let spec = grid_spec(&cli(&["--noise", "1", "--cols", "7", "--width", "2"]), &config);
        assert_eq!(spec.density, (2, 7));
        assert_eq!(spec.width, 2);
        assert_eq!(spec.color, LineColor::new(1, 2, 3));
    }

    #[test]
    fn dotted_extension() {
        assert_eq!(dotted("mkv"), ".mkv");
        assert_eq!(dotted(".mkv"), ".mkv");
    }

    #[test]
    fn resolve_input_existing_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::from_root(dir.path());
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, b"").unwrap();

        let (directory, name) = resolve_input(&file, &paths).unwrap();
        assert_eq!(directory, dir.path());
        assert_eq!(name, "clip.mp4");

        let (directory, name) = resolve_input(Path::new("absent.mp4"), &paths).unwrap();
        assert_eq!(directory, paths.input_videos);
        assert_eq!(name, "absent.mp4");
    }

    #[test]
    fn noise_source_with_still_frame_only() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::from_root(dir.path());
        paths.ensure_dirs().unwrap();

        let args = cli(&[
            "--noise", "3", "--size", "12x16", "--rows", "1", "--cols", "1", "--color",
            "255,0,0", "--save-frame", "-1", "--no-save",
        ]);
        let outputs = run_grid(&args, &GridvidConfig::default(), &paths).unwrap();
        assert!(outputs.video.is_none());

        let frame = outputs.frame.unwrap();
        assert_eq!(frame.parent(), Some(paths.image_output.as_path()));
        let img = image::open(&frame).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (16, 12));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(15, 11).0, [255, 0, 0]);
    }

    #[test]
    fn missing_input_reports_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::from_root(dir.path());
        let err = run_grid(
            &cli(&["--input", "nowhere.mp4", "--no-save"]),
            &GridvidConfig::default(),
            &paths,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<gv_core::CoreError>(),
            Some(gv_core::CoreError::FileNotFound { .. })
        ));
    }
}
