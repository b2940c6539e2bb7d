use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

use gv_core::frame::FrameRef;
use gv_core::naming::unique_name;
use gv_core::paths::Paths;
use gv_core::video::VideoBuffer;

/// Extension des images exportées par défaut.
pub const DEFAULT_IMAGE_EXTENSION: &str = ".png";

/// Options d'export d'une image fixe.
#[derive(Clone, Debug, Default)]
pub struct FrameOptions {
    /// Nom sans extension. Défaut : nom unique préfixé par le nom de la vidéo.
    pub filename: Option<String>,
    /// Avec le point. Défaut : [`DEFAULT_IMAGE_EXTENSION`]. Le format suit l'extension.
    pub extension: Option<String>,
    /// Défaut : [`Paths::image_output`].
    pub directory: Option<PathBuf>,
}

/// Écrit une frame RGB dans un fichier image. Le format est déduit de l'extension.
///
/// # Errors
/// Retourne une erreur si les pixels ne correspondent pas aux dimensions ou
/// si l'écriture échoue.
pub fn write_image(frame: &FrameRef<'_>, path: &Path) -> Result<()> {
    let img = RgbImage::from_raw(frame.width, frame.height, frame.data.to_vec())
        .context("Dimensions de frame incohérentes")?;
    img.save(path)
        .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    Ok(())
}

/// Enregistre la frame `index` (négatif = depuis la fin) de `rendered` en image.
///
/// Retourne le chemin écrit.
///
/// # Errors
/// [`gv_core::CoreError::IndexOutOfRange`] si l'index est invalide, ou erreur d'écriture.
///
/// # Example
/// ```no_run
/// use gv_core::{Paths, VideoBuffer};
/// use gv_export::still::{FrameOptions, save_frame};
///
/// let video = VideoBuffer::new(vec![0u8; 4 * 4 * 3], 1, 4, 4, 30).unwrap();
/// let path = save_frame(&video, -1, &FrameOptions::default(), &Paths::default()).unwrap();
/// ```
pub fn save_frame(
    video: &VideoBuffer,
    index: isize,
    options: &FrameOptions,
    paths: &Paths,
) -> Result<PathBuf> {
    let frame = video.get_frame(index)?;

    let filename = options
        .filename
        .clone()
        .unwrap_or_else(|| unique_name(Some(video.name()), None));
    let extension = options
        .extension
        .as_deref()
        .unwrap_or(DEFAULT_IMAGE_EXTENSION);
    let directory = options
        .directory
        .as_deref()
        .unwrap_or(paths.image_output.as_path());
    let path = directory.join(format!("{filename}{extension}"));

    write_image(&frame, &path)?;
    log::info!("Frame {index} enregistrée dans {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gv_core::CoreError;
    use gv_core::frame::FrameBuffer;

    fn two_frames() -> VideoBuffer {
        let mut data = vec![0u8; 2 * 3 * 5 * 3];
        // Frame 1 entièrement verte
        for px in data[3 * 5 * 3..].chunks_exact_mut(3) {
            px[1] = 255;
        }
        VideoBuffer::new(data, 2, 3, 5, 30).unwrap().with_name("clip")
    }

    #[test]
    fn saves_last_frame_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::from_root(dir.path());
        paths.ensure_dirs().unwrap();

        let path = save_frame(&two_frames(), -1, &FrameOptions::default(), &paths).unwrap();
        assert_eq!(path.parent(), Some(paths.image_output.as_path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (5, 3));
        assert_eq!(img.get_pixel(4, 2).0, [0, 255, 0]);
    }

    #[test]
    fn explicit_name_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let opts = FrameOptions {
            filename: Some("first".into()),
            extension: Some(".bmp".into()),
            directory: Some(dir.path().to_path_buf()),
        };
        let path = save_frame(&two_frames(), 0, &opts, &Paths::from_root(dir.path())).unwrap();
        assert_eq!(path, dir.path().join("first.bmp"));
        assert_eq!(image::open(&path).unwrap().to_rgb8().get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn out_of_range_index() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::from_root(dir.path());
        let err = save_frame(&two_frames(), 2, &FrameOptions::default(), &paths).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn write_image_rejects_short_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let fb = FrameBuffer {
            data: vec![0u8; 5],
            width: 2,
            height: 2,
        };
        assert!(write_image(&fb.as_frame(), &dir.path().join("x.png")).is_err());
    }
}
