use gv_core::error::CoreResult;
use gv_core::frame::CHANNELS;
use gv_core::video::VideoBuffer;
use rayon::prelude::*;

use crate::geometry::{GridSpec, LineIndexSet, line_indices};

/// Peint une grille sur chaque frame de `rendered`.
///
/// Les lignes sont peintes avant les colonnes : aux intersections, la couleur
/// finale est celle de la colonne. `original` n'est jamais touché.
///
/// Une vidéo déjà quadrillée n'est pas remise à zéro : la nouvelle grille se
/// superpose à la précédente. Appeler [`clear_grid`] d'abord pour repartir
/// d'une image propre.
///
/// # Errors
/// [`gv_core::CoreError::InvalidParameter`] si `spec` est invalide. Rien n'est
/// modifié dans ce cas.
///
/// # Example
/// ```
/// use gv_core::{LineColor, VideoBuffer};
/// use gv_grid::compositor::apply_grid;
/// use gv_grid::geometry::GridSpec;
///
/// let mut video = VideoBuffer::new(vec![0u8; 2 * 10 * 10 * 3], 2, 10, 10, 30).unwrap();
/// let spec = GridSpec::new(1, 1).with_color(LineColor::new(255, 0, 0));
/// let lines = apply_grid(&mut video, &spec).unwrap();
/// assert_eq!(lines.rows, vec![0, 5, 9]);
/// assert_eq!(video.get_frame(-1).unwrap().pixel(5, 3), (255, 0, 0));
/// ```
pub fn apply_grid(video: &mut VideoBuffer, spec: &GridSpec) -> CoreResult<LineIndexSet> {
    let lines = line_indices(spec, video.height(), video.width())?;
    let frame_len = video.frame_len();
    let width = video.width();
    let color = spec.color.to_array();

    video
        .rendered_mut()
        .par_chunks_mut(frame_len)
        .for_each(|frame| paint_frame(frame, width, &lines, color));

    log::debug!(
        "Grille {}x{} (épaisseur {}) : {} lignes, {} colonnes peintes sur {} frames",
        spec.density.0,
        spec.density.1,
        spec.width,
        lines.rows.len(),
        lines.cols.len(),
        video.len()
    );
    Ok(lines)
}

/// Efface toute grille : `rendered` redevient une copie de `original`.
pub fn clear_grid(video: &mut VideoBuffer) {
    video.reset_rendered();
}

/// Peint les lignes puis les colonnes de `lines` dans une frame RGB row-major.
///
/// Les indices hors de la frame sont ignorés.
#[inline]
pub fn paint_frame(frame: &mut [u8], width: usize, lines: &LineIndexSet, color: [u8; 3]) {
    let stride = width * CHANNELS;
    if stride == 0 {
        return;
    }
    let height = frame.len() / stride;

    for &row in lines.rows.iter().filter(|&&r| r < height) {
        for px in frame[row * stride..(row + 1) * stride].chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&color);
        }
    }

    for line in frame.chunks_exact_mut(stride) {
        for &col in lines.cols.iter().filter(|&&c| c < width) {
            let idx = col * CHANNELS;
            line[idx..idx + CHANNELS].copy_from_slice(&color);
        }
    }
}

/// Méthodes de grille directement sur [`VideoBuffer`].
///
/// # Example
/// ```
/// use gv_core::VideoBuffer;
/// use gv_core::video::GridState;
/// use gv_grid::compositor::GridExt;
/// use gv_grid::geometry::GridSpec;
///
/// let mut video = VideoBuffer::new(vec![0u8; 8 * 8 * 3], 1, 8, 8, 30).unwrap();
/// video.create_grid(&GridSpec::new(2, 2)).unwrap();
/// assert_eq!(video.grid_state(), GridState::Gridded);
/// video.remove_grid();
/// assert_eq!(video.rendered(), video.original());
/// ```
pub trait GridExt {
    /// Voir [`apply_grid`].
    ///
    /// # Errors
    /// Voir [`apply_grid`].
    fn create_grid(&mut self, spec: &GridSpec) -> CoreResult<LineIndexSet>;

    /// Voir [`clear_grid`].
    fn remove_grid(&mut self);
}

impl GridExt for VideoBuffer {
    fn create_grid(&mut self, spec: &GridSpec) -> CoreResult<LineIndexSet> {
        apply_grid(self, spec)
    }

    fn remove_grid(&mut self) {
        clear_grid(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gv_core::color::LineColor;
    use gv_core::error::CoreError;
    use gv_core::frame::FrameBuffer;
    use gv_core::video::GridState;

    const RED: LineColor = LineColor::new(255, 0, 0);

    fn zeros(frames: usize, h: usize, w: usize) -> VideoBuffer {
        VideoBuffer::new(vec![0u8; frames * h * w * CHANNELS], frames, h, w, 30).unwrap()
    }

    fn noisy(frames: usize, h: usize, w: usize) -> VideoBuffer {
        let data = (0..frames * h * w * CHANNELS)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 7) as u8)
            .collect();
        VideoBuffer::new(data, frames, h, w, 30).unwrap()
    }

    #[test]
    fn scenario_ten_frames_red_grid() {
        let mut video = zeros(10, 100, 100);
        let lines = apply_grid(&mut video, &GridSpec::new(3, 3).with_color(RED)).unwrap();
        let expected = [0usize, 25, 50, 74, 99];
        assert_eq!(lines.rows, expected);
        assert_eq!(lines.cols, expected);

        for frame in &video {
            for y in 0..100u32 {
                for x in 0..100u32 {
                    let on_line =
                        expected.contains(&(y as usize)) || expected.contains(&(x as usize));
                    let want = if on_line { (255, 0, 0) } else { (0, 0, 0) };
                    assert_eq!(frame.pixel(x, y), want, "x={x} y={y}");
                }
            }
        }
        assert!(video.original().iter().all(|&b| b == 0));
    }

    #[test]
    fn paint_frame_covers_full_rows_and_columns() {
        let lines = LineIndexSet {
            rows: vec![1],
            cols: vec![2],
        };
        let mut frame = vec![0u8; 5 * 4 * CHANNELS];
        paint_frame(&mut frame, 5, &lines, [10, 20, 30]);
        let fb = FrameBuffer {
            data: frame,
            width: 5,
            height: 4,
        };
        for x in 0..5 {
            assert_eq!(fb.pixel(x, 1), (10, 20, 30));
        }
        for y in 0..4 {
            assert_eq!(fb.pixel(2, y), (10, 20, 30));
        }
        assert_eq!(fb.pixel(0, 0), (0, 0, 0));
        assert_eq!(fb.pixel(4, 3), (0, 0, 0));
    }

    #[test]
    fn paint_frame_ignores_out_of_frame_indices() {
        let lines = LineIndexSet {
            rows: vec![9],
            cols: vec![9],
        };
        let mut frame = vec![0u8; 3 * 3 * CHANNELS];
        paint_frame(&mut frame, 3, &lines, [1, 1, 1]);
        assert!(frame.iter().all(|&b| b == 0));
    }

    #[test]
    fn clear_restores_original_bit_exact() {
        let mut video = noisy(3, 17, 23);
        let original = video.to_array();

        apply_grid(&mut video, &GridSpec::new(2, 5).with_width(3)).unwrap();
        apply_grid(&mut video, &GridSpec::new(7, 1).with_color(RED)).unwrap();
        assert_ne!(video.rendered(), original.as_slice());
        assert_eq!(video.original(), original.as_slice());

        clear_grid(&mut video);
        assert_eq!(video.rendered(), original.as_slice());
        assert_eq!(video.grid_state(), GridState::Clean);

        // Sur une vidéo propre : no-op
        clear_grid(&mut video);
        assert_eq!(video.rendered(), original.as_slice());
    }

    #[test]
    fn reapplying_composites_onto_current_render() {
        let mut video = zeros(1, 20, 20);
        // Bords rouges de 2 px : colonnes 0, 1 et 19.
        apply_grid(&mut video, &GridSpec::new(0, 0).with_width(2).with_color(RED)).unwrap();
        apply_grid(&mut video, &GridSpec::new(1, 1).with_color(LineColor::new(0, 0, 255)))
            .unwrap();
        let frame = video.get_frame(0).unwrap();
        assert_eq!(frame.pixel(0, 5), (0, 0, 255));
        assert_eq!(frame.pixel(1, 5), (255, 0, 0));
        assert_eq!(frame.pixel(10, 5), (0, 0, 255));
        assert_eq!(frame.pixel(5, 5), (0, 0, 0));
    }

    #[test]
    fn painting_is_frame_independent() {
        let multi = noisy(6, 31, 47);
        let spec = GridSpec::new(4, 2).with_width(2).with_color(RED);

        let mut gridded = multi.clone();
        apply_grid(&mut gridded, &spec).unwrap();

        for (i, frame) in multi.frames().enumerate() {
            let mut single = VideoBuffer::new(frame.data.to_vec(), 1, 31, 47, 30).unwrap();
            apply_grid(&mut single, &spec).unwrap();
            assert_eq!(
                single.get_frame(0).unwrap(),
                gridded.get_frame(i as isize).unwrap(),
                "frame {i}"
            );
        }
    }

    #[test]
    fn invalid_spec_leaves_video_clean() {
        let mut video = noisy(2, 5, 5);
        let err = apply_grid(&mut video, &GridSpec::new(1, 1).with_width(0));
        assert!(matches!(err, Err(CoreError::InvalidParameter { .. })));
        assert_eq!(video.grid_state(), GridState::Clean);
        assert_eq!(video.rendered(), video.original());
    }

    #[test]
    fn oversized_width_on_short_frame() {
        let mut video = zeros(2, 4, 9);
        let lines = apply_grid(&mut video, &GridSpec::new(0, 0).with_width(5)).unwrap();
        assert_eq!(lines.rows, vec![0, 1, 2, 3]);
        assert!(video.rendered().iter().all(|&b| b == 255));
    }
}
