use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use gv_core::frame::FrameRef;
use gv_core::naming::unique_name;
use gv_core::paths::Paths;
use gv_core::video::VideoBuffer;

const VP9_LOSSLESS: &[&str] = &["-c:v", "libvpx-vp9", "-lossless", "1"];

// RGB sans sous-échantillonnage chroma : accepte les dimensions impaires.
const X264_RGB_LOSSLESS: &[&str] = &[
    "-c:v",
    "libx264rgb",
    "-crf",
    "0",
    "-preset",
    "veryfast",
    "-pix_fmt",
    "rgb24",
];

/// Arguments d'encodage sans perte selon le conteneur.
fn codec_args(output_path: &Path) -> &'static [&'static str] {
    let is_webm = output_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("webm"));
    if is_webm { VP9_LOSSLESS } else { X264_RGB_LOSSLESS }
}

/// Encode des frames RGB24 brutes dans un fichier vidéo avec ffmpeg (lossless).
pub struct VideoEncoder {
    ffmpeg_child: Child,
    frame_bytes: usize,
}

impl VideoEncoder {
    /// Crée un encodeur vidéo écrivant dans `output_path`.
    ///
    /// # Errors
    /// Retourne une erreur si ffmpeg n'est pas installé ou impossible à démarrer.
    pub fn new(output_path: &Path, width: u32, height: u32, fps: u32) -> Result<Self> {
        let path_str = output_path.to_str().context("Chemin invalide")?;
        let size = format!("{width}x{height}");
        let rate = fps.to_string();

        let child = Command::new("ffmpeg")
            .args([
                "-y",
                "-f",
                "rawvideo",
                "-vcodec",
                "rawvideo",
                "-s",
                &size,
                "-pix_fmt",
                "rgb24",
                "-r",
                &rate,
                "-i",
                "-",
            ])
            .args(codec_args(output_path))
            .args(["-hide_banner", "-loglevel", "error", path_str])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Échec de l'initialisation de l'encodeur vidéo ffmpeg. (Est-il dans PATH ?)")?;

        log::debug!("ffmpeg encodeur spawné: {size} @ {fps}fps → {}", output_path.display());
        Ok(Self {
            ffmpeg_child: child,
            frame_bytes: width as usize * height as usize * 3,
        })
    }

    /// Ajoute une frame au flux.
    ///
    /// # Errors
    /// Retourne une erreur si la frame n'a pas la taille attendue ou si
    /// l'écriture dans le pipe échoue.
    pub fn write_frame(&mut self, frame: &FrameRef<'_>) -> Result<()> {
        if frame.data.len() != self.frame_bytes {
            anyhow::bail!(
                "Frame de {} octets, l'encodeur attend {}",
                frame.data.len(),
                self.frame_bytes
            );
        }
        if let Some(stdin) = self.ffmpeg_child.stdin.as_mut() {
            stdin
                .write_all(frame.data)
                .context("Écriture vers ffmpeg impossible")?;
        }
        Ok(())
    }

    /// Ferme le flux et finalise l'exportation.
    ///
    /// # Errors
    /// Retourne une erreur si ffmpeg signale une erreur de terminaison.
    pub fn finish(mut self) -> Result<()> {
        drop(self.ffmpeg_child.stdin.take());

        let output = self.ffmpeg_child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg encoder error: {stderr}");
        }
        Ok(())
    }
}

/// Options d'enregistrement d'une vidéo. Chaque champ `None` prend la valeur
/// par défaut de la vidéo ou de [`Paths`].
#[derive(Clone, Debug, Default)]
pub struct SaveOptions {
    /// Nom sans extension. Défaut : nom unique préfixé par le nom de la vidéo.
    pub filename: Option<String>,
    /// Défaut : FPS de la vidéo.
    pub fps: Option<u32>,
    /// Avec le point. Défaut : extension de la vidéo.
    pub extension: Option<String>,
    /// Défaut : [`Paths::output_videos`].
    pub directory: Option<PathBuf>,
}

/// Chemin final d'une vidéo enregistrée avec `options`.
///
/// # Example
/// ```
/// use gv_core::{Paths, VideoBuffer};
/// use gv_export::muxer::{SaveOptions, output_path};
/// use std::path::Path;
///
/// let video = VideoBuffer::new(vec![0u8; 12], 1, 2, 2, 30).unwrap();
/// let paths = Paths::from_root(Path::new("/tmp/gv"));
/// let opts = SaveOptions { filename: Some("grid_sample".into()), ..Default::default() };
/// assert_eq!(output_path(&video, &opts, &paths), paths.output_videos.join("grid_sample.mp4"));
/// ```
#[must_use]
pub fn output_path(video: &VideoBuffer, options: &SaveOptions, paths: &Paths) -> PathBuf {
    let filename = options
        .filename
        .clone()
        .unwrap_or_else(|| unique_name(Some(video.name()), None));
    let extension = options.extension.as_deref().unwrap_or(video.extension());
    let directory = options
        .directory
        .as_deref()
        .unwrap_or(paths.output_videos.as_path());
    directory.join(format!("{filename}{extension}"))
}

/// Enregistre les frames de travail (`rendered`) d'une vidéo.
///
/// Retourne le chemin écrit.
///
/// # Errors
/// `fps == 0` ou toute erreur ffmpeg, propagée telle quelle.
pub fn save_video(video: &VideoBuffer, options: &SaveOptions, paths: &Paths) -> Result<PathBuf> {
    let fps = options.fps.unwrap_or(video.fps());
    if fps == 0 {
        return Err(gv_core::CoreError::invalid("fps", "must be a positive integer").into());
    }
    let path = output_path(video, options, paths);

    let mut encoder = VideoEncoder::new(
        &path,
        video.width() as u32,
        video.height() as u32,
        fps,
    )?;
    for frame in video {
        encoder.write_frame(&frame)?;
    }
    encoder.finish()?;

    log::info!("{} frames enregistrées dans {}", video.len(), path.display());
    Ok(path)
}
