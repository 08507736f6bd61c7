//! `stocksync rules` handlers.

use std::path::{Path, PathBuf};

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum RulesCommands {
    /// Parse and validate a matching rules file without contacting either platform
    Check {
        /// Rules file to check
        #[arg(
            long,
            env = "STOCKSYNC_RULES_PATH",
            default_value = "./config/matching.yaml"
        )]
        path: PathBuf,
    },
}

/// Loads the file strictly (a missing file is an error here, unlike a sync
/// run) and compiles the size patterns.
pub(crate) fn run_rules_check(path: &Path) -> anyhow::Result<()> {
    let rules = stocksync_core::load_rules(path)?;
    let keys = stocksync_matching::KeyBuilder::new(rules)?;
    let rules = keys.rules();

    let synonyms: usize = rules.letter_sizes.iter().map(|l| l.synonyms.len()).sum();
    println!(
        "{}: ok ({} name corrections, {} suffixes, {} numeric sizes, {} letter sizes with {} synonyms, {} brand filters)",
        path.display(),
        rules.name_corrections.len(),
        rules.name_suffixes.len(),
        rules.numeric_sizes.len(),
        rules.letter_sizes.len(),
        synonyms,
        rules.brand_filters.len(),
    );
    Ok(())
}
