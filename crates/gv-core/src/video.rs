use std::slice::ChunksExact;

use crate::error::{CoreError, CoreResult};
use crate::frame::{CHANNELS, FrameBuffer, FrameRef};

/// Nom affiché par défaut d'une vidéo sans fichier source.
pub const DEFAULT_VIDEO_NAME: &str = "video";

/// Extensions vidéo acceptées en entrée. La première sert d'extension de sortie par défaut.
pub const INPUT_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi", ".mkv", ".webm"];

/// État de la grille sur une vidéo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GridState {
    /// `rendered` est identique à `original`.
    #[default]
    Clean,
    /// `rendered` a été modifié (grille peinte ou frame remplacée via
    /// [`VideoBuffer::set_frame`]) et peut différer de `original`.
    Gridded,
}

/// Vidéo entièrement matérialisée en mémoire, forme (frames, hauteur, largeur, 3).
///
/// Possède deux tableaux indépendants : `original`, jamais modifié après
/// construction, et `rendered`, la copie de travail sur laquelle les grilles
/// sont peintes. Les deux ont toujours la même forme.
///
/// # Example
/// ```
/// use gv_core::video::VideoBuffer;
/// let video = VideoBuffer::new(vec![0u8; 2 * 4 * 5 * 3], 2, 4, 5, 24).unwrap();
/// assert_eq!(video.shape(), (2, 4, 5, 3));
/// assert_eq!(video.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct VideoBuffer {
    original: Vec<u8>,
    rendered: Vec<u8>,
    frames: usize,
    height: usize,
    width: usize,
    fps: u32,
    name: String,
    extension: String,
    state: GridState,
}

impl VideoBuffer {
    /// Construit une vidéo à partir de pixels RGB row-major, frame après frame.
    ///
    /// `data` est copié deux fois : une pour `original`, une pour `rendered`.
    ///
    /// # Errors
    /// [`CoreError::InvalidParameter`] si une dimension ou `fps` vaut 0, ou si
    /// `data.len() != frames * height * width * 3`.
    pub fn new(
        data: Vec<u8>,
        frames: usize,
        height: usize,
        width: usize,
        fps: u32,
    ) -> CoreResult<Self> {
        if frames == 0 || height == 0 || width == 0 {
            return Err(CoreError::invalid(
                "data",
                format!("shape ({frames}, {height}, {width}, 3) has an empty dimension"),
            ));
        }
        if fps == 0 {
            return Err(CoreError::invalid("fps", "must be a positive integer"));
        }
        let expected = frames
            .checked_mul(height)
            .and_then(|n| n.checked_mul(width))
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| {
                CoreError::invalid(
                    "data",
                    format!("shape ({frames}, {height}, {width}, 3) overflows usize"),
                )
            })?;
        if data.len() != expected {
            return Err(CoreError::invalid(
                "data",
                format!(
                    "expected {expected} bytes for shape ({frames}, {height}, {width}, 3), got {}",
                    data.len()
                ),
            ));
        }

        let rendered = data.clone();
        Ok(Self {
            original: data,
            rendered,
            frames,
            height,
            width,
            fps,
            name: DEFAULT_VIDEO_NAME.to_string(),
            extension: INPUT_EXTENSIONS[0].to_string(),
            state: GridState::Clean,
        })
    }

    /// Builder : nom affiché (préfixe des fichiers exportés).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder : extension de sortie par défaut (avec le point, ex. `.mkv`).
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    // === Métadonnées ===

    /// (frames, hauteur, largeur, canaux).
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.frames, self.height, self.width, CHANNELS)
    }

    /// Nombre de frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames
    }

    /// Toujours `false` : une vidéo a au moins une frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Nombre total d'éléments du tableau de pixels.
    #[must_use]
    pub fn size(&self) -> usize {
        self.original.len()
    }

    /// Taille d'un élément en octets.
    #[must_use]
    pub fn itemsize(&self) -> usize {
        std::mem::size_of::<u8>()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Octets par frame.
    #[must_use]
    pub fn frame_len(&self) -> usize {
        self.height * self.width * CHANNELS
    }

    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn grid_state(&self) -> GridState {
        self.state
    }

    // === Données brutes ===

    /// Pixels d'origine, jamais modifiés.
    #[must_use]
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Copie possédée des pixels d'origine.
    #[must_use]
    pub fn to_array(&self) -> Vec<u8> {
        self.original.clone()
    }

    /// Pixels de travail (avec grille éventuelle).
    #[must_use]
    pub fn rendered(&self) -> &[u8] {
        &self.rendered
    }

    /// Accès mutable aux pixels de travail, pour le compositeur.
    ///
    /// Passe l'état à [`GridState::Gridded`] : tout appelant est supposé écrire,
    /// et [`VideoBuffer::reset_rendered`] doit alors restaurer `original`.
    pub fn rendered_mut(&mut self) -> &mut [u8] {
        self.state = GridState::Gridded;
        &mut self.rendered
    }

    /// Remet `rendered` à une copie fraîche de `original`.
    pub fn reset_rendered(&mut self) {
        if self.state == GridState::Clean {
            return;
        }
        self.rendered.copy_from_slice(&self.original);
        self.state = GridState::Clean;
    }

    // === Accès par frame ===

    /// Convertit un index éventuellement négatif (-1 = dernière frame) en offset.
    ///
    /// # Errors
    /// [`CoreError::IndexOutOfRange`] si l'index sort de `[-len, len)`.
    ///
    /// # Example
    /// ```
    /// use gv_core::video::VideoBuffer;
    /// let video = VideoBuffer::new(vec![0u8; 3 * 3], 3, 1, 1, 30).unwrap();
    /// assert_eq!(video.resolve_index(-1), Ok(2));
    /// assert!(video.resolve_index(3).is_err());
    /// ```
    pub fn resolve_index(&self, index: isize) -> CoreResult<usize> {
        let len = self.frames;
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs()).filter(|&i| i < len)
        };
        resolved.ok_or(CoreError::IndexOutOfRange { index, len })
    }

    fn frame_at<'a>(&self, data: &'a [u8], frame: usize) -> FrameRef<'a> {
        let len = self.frame_len();
        FrameRef {
            data: &data[frame * len..(frame + 1) * len],
            width: self.width as u32,
            height: self.height as u32,
        }
    }

    /// Frame `index` de `rendered`.
    ///
    /// # Errors
    /// [`CoreError::IndexOutOfRange`] si l'index est invalide.
    pub fn get_frame(&self, index: isize) -> CoreResult<FrameRef<'_>> {
        let i = self.resolve_index(index)?;
        Ok(self.frame_at(&self.rendered, i))
    }

    /// Frame `index` de `original`.
    ///
    /// # Errors
    /// [`CoreError::IndexOutOfRange`] si l'index est invalide.
    pub fn original_frame(&self, index: isize) -> CoreResult<FrameRef<'_>> {
        let i = self.resolve_index(index)?;
        Ok(self.frame_at(&self.original, i))
    }

    /// Remplace la frame `index` de `rendered`.
    ///
    /// # Errors
    /// [`CoreError::IndexOutOfRange`] si l'index est invalide,
    /// [`CoreError::InvalidValue`] si la forme de `pixels` diffère.
    pub fn set_frame(&mut self, index: isize, pixels: &FrameBuffer) -> CoreResult<()> {
        let i = self.resolve_index(index)?;
        let len = self.frame_len();
        if pixels.width as usize != self.width
            || pixels.height as usize != self.height
            || pixels.data.len() != len
        {
            return Err(CoreError::InvalidValue(format!(
                "frame {}x{} ({} bytes) does not fit video frames {}x{} ({len} bytes)",
                pixels.width,
                pixels.height,
                pixels.data.len(),
                self.width,
                self.height,
            )));
        }
        self.rendered_mut()[i * len..(i + 1) * len].copy_from_slice(&pixels.data);
        Ok(())
    }

    /// Pixel (x, y) de la frame `index` de `rendered` → (r, g, b).
    ///
    /// # Errors
    /// [`CoreError::IndexOutOfRange`] si la frame, `x` ou `y` sort des bornes.
    ///
    /// # Example
    /// ```
    /// use gv_core::video::VideoBuffer;
    /// let video = VideoBuffer::new(vec![9u8; 2 * 2 * 3], 1, 2, 2, 30).unwrap();
    /// assert_eq!(video.pixel(-1, 1, 1), Ok((9, 9, 9)));
    /// assert!(video.pixel(0, 5, 5).is_err());
    /// ```
    pub fn pixel(&self, index: isize, x: usize, y: usize) -> CoreResult<(u8, u8, u8)> {
        let frame = self.get_frame(index)?;
        if x >= self.width {
            return Err(CoreError::IndexOutOfRange {
                index: x as isize,
                len: self.width,
            });
        }
        if y >= self.height {
            return Err(CoreError::IndexOutOfRange {
                index: y as isize,
                len: self.height,
            });
        }
        let idx = (y * self.width + x) * CHANNELS;
        Ok((frame.data[idx], frame.data[idx + 1], frame.data[idx + 2]))
    }

    /// Itère les frames de `rendered`, de 0 à F-1. Chaque appel repart de 0.
    ///
    /// # Example
    /// ```
    /// use gv_core::video::VideoBuffer;
    /// let video = VideoBuffer::new(vec![7u8; 4 * 2 * 2 * 3], 4, 2, 2, 30).unwrap();
    /// assert_eq!(video.frames().count(), 4);
    /// assert_eq!(video.frames().count(), 4);
    /// ```
    #[must_use]
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            chunks: self.rendered.chunks_exact(self.frame_len()),
            width: self.width as u32,
            height: self.height as u32,
        }
    }
}

/// Itérateur sur les frames d'une [`VideoBuffer`].
pub struct Frames<'a> {
    chunks: ChunksExact<'a, u8>,
    width: u32,
    height: u32,
}

impl<'a> Iterator for Frames<'a> {
    type Item = FrameRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next().map(|data| FrameRef {
            data,
            width: self.width,
            height: self.height,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Frames<'_> {}

impl<'a> IntoIterator for &'a VideoBuffer {
    type Item = FrameRef<'a>;
    type IntoIter = Frames<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize, h: usize, w: usize) -> VideoBuffer {
        let data = (0..frames * h * w * CHANNELS).map(|i| (i % 251) as u8).collect();
        VideoBuffer::new(data, frames, h, w, 25).unwrap()
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(VideoBuffer::new(vec![], 0, 1, 1, 30).is_err());
        assert!(VideoBuffer::new(vec![0; 3], 1, 1, 1, 0).is_err());
        assert!(matches!(
            VideoBuffer::new(vec![0; 10], 1, 2, 2, 30),
            Err(CoreError::InvalidParameter { name: "data", .. })
        ));
    }

    #[test]
    fn defaults_metadata() {
        let v = ramp(1, 1, 1);
        assert_eq!(v.name(), DEFAULT_VIDEO_NAME);
        assert_eq!(v.extension(), ".mp4");
        assert_eq!(v.itemsize(), 1);
        assert_eq!(v.size(), 3);
        assert_eq!(v.grid_state(), GridState::Clean);
    }

    #[test]
    fn overflowing_shape_is_rejected() {
        assert!(matches!(
            VideoBuffer::new(vec![0u8; 3], usize::MAX, 2, 1, 30),
            Err(CoreError::InvalidParameter { name: "data", .. })
        ));
        assert!(VideoBuffer::new(vec![0u8; 3], 1, usize::MAX / 2, 3, 30).is_err());
    }

    #[test]
    fn checked_pixel_access() {
        let v = ramp(2, 2, 3);
        // Frame 1, x=2, y=1 : offset 18 + (1 * 3 + 2) * 3 = 33
        assert_eq!(v.pixel(1, 2, 1), Ok((33, 34, 35)));
        assert_eq!(v.pixel(-1, 2, 1), v.pixel(1, 2, 1));
        assert_eq!(
            v.pixel(0, 3, 0),
            Err(CoreError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            v.pixel(0, 0, 5),
            Err(CoreError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(
            v.pixel(2, 0, 0),
            Err(CoreError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn original_frame_ignores_rendered_edits() {
        let mut v = ramp(3, 2, 2);
        let before = v.original_frame(-1).unwrap().data.to_vec();
        v.set_frame(2, &FrameBuffer::filled(2, 2, [255, 0, 0])).unwrap();

        assert_eq!(v.original_frame(-1).unwrap().data, before.as_slice());
        assert_eq!(v.original_frame(2).unwrap(), v.original_frame(-1).unwrap());
        assert_ne!(v.get_frame(-1).unwrap(), v.original_frame(-1).unwrap());
        assert_eq!(
            v.original_frame(-4),
            Err(CoreError::IndexOutOfRange { index: -4, len: 3 })
        );
    }

    #[test]
    fn negative_index_counts_from_end() {
        let v = ramp(5, 2, 3);
        let last = v.get_frame(-1).unwrap();
        let direct = v.get_frame(4).unwrap();
        assert_eq!(last, direct);
        assert_eq!(v.get_frame(-5).unwrap(), v.get_frame(0).unwrap());
        assert_eq!(
            v.get_frame(-6),
            Err(CoreError::IndexOutOfRange { index: -6, len: 5 })
        );
        assert!(v.get_frame(5).is_err());
    }

    #[test]
    fn set_frame_checks_shape_and_leaves_original() {
        let mut v = ramp(3, 2, 2);
        let before = v.to_array();

        let wrong = FrameBuffer::new(3, 2);
        assert!(matches!(v.set_frame(0, &wrong), Err(CoreError::InvalidValue(_))));
        assert_eq!(v.grid_state(), GridState::Clean);

        let white = FrameBuffer::filled(2, 2, [255, 255, 255]);
        v.set_frame(-2, &white).unwrap();
        // Une frame remplacée compte comme une modification : reset doit la défaire.
        assert_eq!(v.grid_state(), GridState::Gridded);
        assert_eq!(v.get_frame(1).unwrap().data, white.data.as_slice());
        assert_eq!(v.original(), before.as_slice());
        assert_ne!(v.rendered(), v.original());

        v.reset_rendered();
        assert_eq!(v.rendered(), v.original());
    }

    #[test]
    fn frames_iterate_in_order_and_restart() {
        let v = ramp(4, 3, 3);
        let first: Vec<_> = v.frames().map(|f| f.data.to_vec()).collect();
        let second: Vec<_> = (&v).into_iter().map(|f| f.data.to_vec()).collect();
        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
        for (i, f) in first.iter().enumerate() {
            assert_eq!(f.as_slice(), v.get_frame(i as isize).unwrap().data);
        }
    }

    #[test]
    fn clone_does_not_alias() {
        let v = ramp(2, 2, 2);
        let mut c = v.clone();
        c.rendered_mut()[0] = 255;
        assert_ne!(v.rendered()[0], 255);
    }
}
