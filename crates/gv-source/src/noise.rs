use gv_core::error::{CoreError, CoreResult};
use gv_core::frame::CHANNELS;
use gv_core::video::{DEFAULT_VIDEO_NAME, VideoBuffer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Paramètres d'une vidéo de bruit.
///
/// # Example
/// ```
/// use gv_source::noise::NoiseParams;
/// let p = NoiseParams::new(10, (48, 64), 24);
/// assert!(!p.grayscale);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoiseParams {
    pub frames: usize,
    /// (hauteur, largeur)
    pub shape: (usize, usize),
    pub fps: u32,
    /// R et G recopient B : chaque pixel est gris.
    pub grayscale: bool,
    pub name: Option<String>,
}

impl NoiseParams {
    #[must_use]
    pub fn new(frames: usize, shape: (usize, usize), fps: u32) -> Self {
        Self {
            frames,
            shape,
            fps,
            grayscale: false,
            name: None,
        }
    }

    #[must_use]
    pub fn grayscale(mut self, on: bool) -> Self {
        self.grayscale = on;
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Vidéo de bruit uniforme, générateur du thread courant.
///
/// # Errors
/// [`CoreError::InvalidParameter`] si une dimension ou `fps` vaut 0.
pub fn noise_video(params: &NoiseParams) -> CoreResult<VideoBuffer> {
    generate(params, &mut rand::rng())
}

/// Vidéo de bruit reproductible à partir d'une graine.
///
/// # Errors
/// [`CoreError::InvalidParameter`] si une dimension ou `fps` vaut 0.
///
/// # Example
/// ```
/// use gv_source::noise::{NoiseParams, noise_video_seeded};
/// let p = NoiseParams::new(2, (4, 4), 30);
/// let a = noise_video_seeded(&p, 7).unwrap();
/// let b = noise_video_seeded(&p, 7).unwrap();
/// assert_eq!(a.original(), b.original());
/// ```
pub fn noise_video_seeded(params: &NoiseParams, seed: u64) -> CoreResult<VideoBuffer> {
    generate(params, &mut StdRng::seed_from_u64(seed))
}

fn generate<R: Rng + ?Sized>(params: &NoiseParams, rng: &mut R) -> CoreResult<VideoBuffer> {
    let (height, width) = params.shape;
    let len = params
        .frames
        .checked_mul(height)
        .and_then(|n| n.checked_mul(width))
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(|| CoreError::invalid("shape", "video is too large to allocate"))?;

    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);
    if params.grayscale {
        for px in data.chunks_exact_mut(CHANNELS) {
            px[0] = px[2];
            px[1] = px[2];
        }
    }

    let name = params.name.as_deref().unwrap_or(DEFAULT_VIDEO_NAME);
    log::debug!(
        "Bruit généré : {} frames {}x{} @ {}fps (gris : {})",
        params.frames,
        width,
        height,
        params.fps,
        params.grayscale
    );
    Ok(VideoBuffer::new(data, params.frames, height, width, params.fps)?.with_name(name))
}
