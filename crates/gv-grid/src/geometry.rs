use gv_core::color::LineColor;
use gv_core::error::{CoreError, CoreResult};

/// Paramètres d'une grille : densité, épaisseur et couleur des lignes.
///
/// La densité compte les lignes *intérieures* ; les deux bords sont toujours
/// ajoutés. `(0, 0)` dessine donc un simple cadre.
///
/// # Example
/// ```
/// use gv_grid::geometry::GridSpec;
/// use gv_core::LineColor;
/// let spec = GridSpec::new(3, 3).with_width(2).with_color(LineColor::new(255, 0, 0));
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSpec {
    /// (lignes horizontales, lignes verticales) intérieures.
    pub density: (u32, u32),
    /// Épaisseur en pixels, >= 1.
    pub width: u32,
    pub color: LineColor,
}

impl GridSpec {
    /// Grille de `rows` × `cols` lignes intérieures, 1 px, blanche.
    #[must_use]
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            density: (rows, cols),
            width: 1,
            color: LineColor::WHITE,
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: LineColor) -> Self {
        self.color = color;
        self
    }

    /// # Errors
    /// [`CoreError::InvalidParameter`] si `width == 0`.
    pub fn validate(&self) -> CoreResult<()> {
        if self.width == 0 {
            return Err(CoreError::invalid(
                "width",
                "an integer greater than or equal to one",
            ));
        }
        Ok(())
    }
}

/// Indices de lignes et colonnes à peindre, triés strictement croissants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineIndexSet {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

/// Positions des `count + 2` lignes guides réparties sur `[0, len - 1]`.
///
/// Position i = round(i·(len-1)/(count+1)), arrondi au demi supérieur,
/// en arithmétique entière. Les doublons sont conservés.
///
/// # Example
/// ```
/// use gv_grid::geometry::guide_positions;
/// assert_eq!(guide_positions(3, 100), vec![0, 25, 50, 74, 99]);
/// assert_eq!(guide_positions(0, 10), vec![0, 9]);
/// ```
#[must_use]
pub fn guide_positions(count: u32, len: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let span = (len - 1) as u128;
    let steps = u128::from(count) + 1;
    (0..=steps)
        .map(|i| ((2 * i * span + steps) / (2 * steps)) as usize)
        .collect()
}

/// Épaissit des positions de base à `width` pixels.
///
/// Décalages `+1, -1, +2, -2, …`, un par pixel au-delà du premier, appliqués à
/// chaque base. Les candidats hors `[0, len - 1]` sont abandonnés. Retourne
/// les positions uniques, triées.
///
/// # Example
/// ```
/// use gv_grid::geometry::thicken;
/// assert_eq!(thicken(&[0, 5, 9], 3, 10), vec![0, 1, 4, 5, 6, 8, 9]);
/// assert_eq!(thicken(&[0, 3], 5, 4), vec![0, 1, 2, 3]);
/// ```
#[must_use]
pub fn thicken(base: &[usize], width: u32, len: usize) -> Vec<usize> {
    let mut out: Vec<usize> = base.iter().copied().filter(|&p| p < len).collect();
    for k in 0..width.saturating_sub(1) as usize {
        let magnitude = k / 2 + 1;
        // Au-delà, tous les candidats sortent du cadre.
        if magnitude >= len {
            break;
        }
        let forward = k % 2 == 0;
        out.extend(base.iter().filter_map(|&p| {
            let candidate = if forward {
                p.checked_add(magnitude)
            } else {
                p.checked_sub(magnitude)
            };
            candidate.filter(|&c| c < len)
        }));
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// Indices d'un axe : guides puis épaississement.
#[must_use]
pub fn axis_indices(count: u32, width: u32, len: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    // Pas <= 1 : chaque pixel de l'axe est déjà une ligne.
    if count as usize + 1 >= len - 1 {
        return (0..len).collect();
    }
    thicken(&guide_positions(count, len), width, len)
}

/// Calcule les lignes et colonnes à peindre pour une frame `height` × `width`.
///
/// # Errors
/// [`CoreError::InvalidParameter`] si la spec est invalide ou si une dimension est nulle.
///
/// # Example
/// ```
/// use gv_grid::geometry::{GridSpec, line_indices};
/// let lines = line_indices(&GridSpec::new(0, 0), 4, 6).unwrap();
/// assert_eq!(lines.rows, vec![0, 3]);
/// assert_eq!(lines.cols, vec![0, 5]);
/// ```
pub fn line_indices(spec: &GridSpec, height: usize, width: usize) -> CoreResult<LineIndexSet> {
    spec.validate()?;
    if height == 0 || width == 0 {
        return Err(CoreError::invalid(
            "frame",
            format!("{width}x{height} has an empty dimension"),
        ));
    }
    let (rows, cols) = spec.density;
    Ok(LineIndexSet {
        rows: axis_indices(rows, spec.width, height),
        cols: axis_indices(cols, spec.width, width),
    })
}
