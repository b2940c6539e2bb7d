use std::path::Path;

use anyhow::Result;
use clap::Parser;
use gv_core::GridvidConfig;

pub mod cli;
pub mod workflow;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source
    cli.validate_source()?;

    // 4. Charger la config, créer l'arborescence
    let config = resolve_config(&cli.config)?;
    let paths = config.paths();
    paths.ensure_dirs()?;

    // 5. Exécuter
    let result = if cli.clean_temp {
        paths.clear_temporary_files().map(|removed| {
            println!("{removed} fichier(s) temporaire(s) supprimé(s)");
        })
    } else if cli.selftest {
        workflow::run_selftest(&config, &paths).map(|out| {
            println!("selftest OK");
            report(&out);
        })
    } else {
        workflow::run_grid(&cli, &config, &paths).map(|out| report(&out))
    };

    // 6. Nettoyage optionnel, même en cas d'erreur
    if config.temp_cleanup_on_exit
        && let Err(e) = paths.clear_temporary_files()
    {
        log::warn!("Nettoyage des fichiers temporaires échoué : {e:#}");
    }

    result
}

fn report(outputs: &workflow::Outputs) {
    if let Some(ref path) = outputs.frame {
        println!("Image : {}", path.display());
    }
    if let Some(ref path) = outputs.video {
        println!("Vidéo : {}", path.display());
    }
}

fn resolve_config(path: &Path) -> Result<GridvidConfig> {
    if path.exists() {
        gv_core::config::load_config(path)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            path.display()
        );
        Ok(GridvidConfig::default())
    }
}
