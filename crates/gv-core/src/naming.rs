use chrono::Local;

/// Génère un nom de fichier unique à partir de la date et l'heure courantes.
///
/// Format : `{prefix_}MM_DD_YYYY_HH_MM_SS_ffffff{_suffix}`. Le séparateur `_`
/// n'est ajouté que s'il manque.
///
/// # Example
/// ```
/// use gv_core::naming::unique_name;
/// let name = unique_name(Some("clip"), None);
/// assert!(name.starts_with("clip_"));
/// assert_eq!(name.len(), "clip_".len() + 26);
/// ```
#[must_use]
pub fn unique_name(prefix: Option<&str>, suffix: Option<&str>) -> String {
    let stamp = Local::now().format("%m_%d_%Y_%H_%M_%S_%6f");
    let prefix = match prefix {
        Some(p) if !p.is_empty() && !p.ends_with('_') => format!("{p}_"),
        Some(p) => p.to_string(),
        None => String::new(),
    };
    let suffix = match suffix {
        Some(s) if !s.is_empty() && !s.starts_with('_') => format!("_{s}"),
        Some(s) => s.to_string(),
        None => String::new(),
    };
    format!("{prefix}{stamp}{suffix}")
}
