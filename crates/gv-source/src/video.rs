// Décodage via ffmpeg en subprocess (std::process::Command), aucun binding C.
// Prérequis : `ffmpeg` et `ffprobe` accessibles dans PATH.
//
//   - `check_input`  : existence du fichier puis extension (allow-list)
//   - `probe_video`  : interroge ffprobe pour obtenir width/height/fps
//   - `decode_video` : lance ffmpeg → flux raw RGB24 sur stdout, lu jusqu'à EOF
//                      (stderr vidé en parallèle pour ne jamais bloquer le pipe)
//   - `load_video`   : assemble le tout en `VideoBuffer`

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;

use gv_core::error::CoreError;
use gv_core::frame::CHANNELS;
use gv_core::video::{INPUT_EXTENSIONS, VideoBuffer};

/// Métadonnées extraites via ffprobe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Images par seconde (ex: 23.976, 24.0, 30.0, 60.0).
    pub fps: f64,
}

impl VideoInfo {
    /// FPS entier pour [`VideoBuffer`] : partie entière, au moins 1.
    ///
    /// # Example
    /// ```
    /// use gv_source::video::VideoInfo;
    /// let info = VideoInfo { width: 2, height: 2, fps: 29.97 };
    /// assert_eq!(info.whole_fps(), 29);
    /// ```
    #[must_use]
    pub fn whole_fps(&self) -> u32 {
        if self.fps.is_finite() {
            (self.fps.floor() as u32).max(1)
        } else {
            1
        }
    }

    /// Octets d'une frame RGB24.
    #[must_use]
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }
}

/// Extension normalisée (`.mp4`) si elle figure dans l'allow-list.
fn allowed_extension(path: &Path) -> Option<String> {
    let ext = format!(
        ".{}",
        path.extension()?.to_str()?.to_lowercase()
    );
    INPUT_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Vérifie qu'un fichier existe puis que son extension est acceptée.
///
/// Retourne l'extension normalisée.
///
/// # Errors
/// [`CoreError::FileNotFound`] puis [`CoreError::UnsupportedFormat`], dans cet ordre.
pub fn check_input(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(CoreError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    allowed_extension(path).ok_or_else(|| {
        CoreError::UnsupportedFormat {
            format: path
                .extension()
                .map_or_else(String::new, |e| format!(".{}", e.to_string_lossy())),
            supported: INPUT_EXTENSIONS.join(","),
        }
        .into()
    })
}

/// Parse la sortie `key=value` de ffprobe.
fn parse_probe_output(text: &str) -> Option<VideoInfo> {
    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;
    let mut fps: f64 = 30.0;

    for line in text.lines() {
        if let Some(val) = line.strip_prefix("width=") {
            width = val.trim().parse().ok();
        } else if let Some(val) = line.strip_prefix("height=") {
            height = val.trim().parse().ok();
        } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
            // Format: "24/1" ou "30000/1001"
            let mut parts = val.trim().splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            if den > 0.0 && num > 0.0 {
                fps = num / den;
            }
        }
    }

    match (width, height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            Some(VideoInfo { width, height, fps })
        }
        _ => None,
    }
}

/// Interroge `ffprobe` pour obtenir les métadonnées du flux vidéo principal.
///
/// # Errors
/// Retourne une erreur si `ffprobe` est introuvable ou si le fichier
/// ne contient aucun flux vidéo décodable.
pub fn probe_video(path: &Path) -> Result<VideoInfo> {
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-of",
            "default=noprint_wrappers=1",
            "-i",
            path_str,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .context(
            "Impossible de lancer ffprobe. Vérifiez que ffprobe est installé et dans le PATH.",
        )?;

    let text = String::from_utf8_lossy(&output.stdout);
    let info = parse_probe_output(&text).with_context(|| {
        format!(
            "ffprobe n'a trouvé aucun flux vidéo dans {}",
            path.display()
        )
    })?;

    log::info!(
        "probe_video: {}x{} @ {:.3}fps ({})",
        info.width,
        info.height,
        info.fps,
        path.display()
    );
    Ok(info)
}

/// Lit exactement `buf.len()` bytes depuis `reader`.
///
/// # Errors
/// Retourne `Ok(true)` si lu avec succès, `Ok(false)` sur EOF avant complétion,
/// `Err` sur erreur I/O fatale.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false), // EOF
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Lit des frames complètes jusqu'à EOF. Une frame tronquée en fin de flux est ignorée.
///
/// Retourne les pixels concaténés et le nombre de frames.
///
/// # Errors
/// Erreur I/O du flux.
pub fn read_frames<R: Read>(reader: &mut R, frame_bytes: usize) -> Result<(Vec<u8>, usize)> {
    if frame_bytes == 0 {
        return Ok((Vec::new(), 0));
    }
    let mut data = Vec::new();
    let mut frame = vec![0u8; frame_bytes];
    let mut count = 0usize;
    while read_exact_or_eof(reader, &mut frame)? {
        data.extend_from_slice(&frame);
        count += 1;
    }
    Ok((data, count))
}

/// Lit les frames sur la sortie standard de `child` jusqu'à EOF, puis attend sa fin.
///
/// stderr est vidé sur un thread dédié pendant la lecture : un processus bavard
/// ne bloque jamais sur un pipe plein. Son contenu remonte dans l'erreur si le
/// code de sortie est non nul.
///
/// # Errors
/// Erreur I/O, ou statut de sortie en échec.
pub fn read_child_frames(mut child: Child, frame_bytes: usize) -> Result<(Vec<u8>, usize)> {
    let stderr = child.stderr.take();
    let stderr_drain = thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut pipe) = stderr {
            let _ = pipe.read_to_string(&mut text);
        }
        text
    });

    let read = child
        .stdout
        .take()
        .context("stdout ffmpeg indisponible")
        .and_then(|mut stdout| read_frames(&mut stdout, frame_bytes));
    if read.is_err() {
        let _ = child.kill();
    }

    let status = child.wait()?;
    let stderr = stderr_drain.join().unwrap_or_default();
    if !status.success() {
        anyhow::bail!("ffmpeg decoder error: {}", stderr.trim());
    }
    read
}

/// Décode toutes les frames d'un fichier vidéo en RGB24.
///
/// # Errors
/// Retourne une erreur si ffprobe/ffmpeg échouent ou si aucune frame n'est lue.
pub fn decode_video(path: &Path) -> Result<(Vec<u8>, usize, VideoInfo)> {
    let info = probe_video(path)?;
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;

    let child = Command::new("ffmpeg")
        .args([
            "-i",
            path_str, // fichier source
            "-f",
            "rawvideo", // format raw
            "-pix_fmt",
            "rgb24", // RGB 3 bytes/pixel
            "-an",   // pas d'audio
            "-hide_banner",
            "-loglevel",
            "error",
            "pipe:1", // stdout
        ])
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .context("Impossible de lancer ffmpeg. Vérifiez que ffmpeg est installé et dans le PATH.")?;

    let (data, frames) = read_child_frames(child, info.frame_bytes())?;
    if frames == 0 {
        anyhow::bail!("Aucune frame décodée depuis {}", path.display());
    }

    log::info!("decode_video: {frames} frames lues depuis {}", path.display());
    Ok((data, frames, info))
}

/// Charge `directory/filename` en [`VideoBuffer`].
///
/// Le nom de la vidéo devient le nom du fichier, son extension devient
/// l'extension de sortie par défaut.
///
/// # Errors
/// [`CoreError::FileNotFound`], [`CoreError::UnsupportedFormat`] (récupérables via
/// `downcast_ref`), ou toute erreur de décodage.
///
/// # Example
/// ```no_run
/// use gv_source::video::load_video;
/// use std::path::Path;
/// let video = load_video("your_video.mp4", Path::new(".")).unwrap();
/// ```
pub fn load_video(filename: &str, directory: &Path) -> Result<VideoBuffer> {
    let path = directory.join(filename);
    let extension = check_input(&path)?;
    let (data, frames, info) = decode_video(&path)?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename)
        .to_string();
    let video = VideoBuffer::new(
        data,
        frames,
        info.height as usize,
        info.width as usize,
        info.whole_fps(),
    )?
    .with_name(name)
    .with_extension(extension);
    Ok(video)
}
