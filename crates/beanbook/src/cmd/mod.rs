//! Subcommand implementations.

pub mod balances;
pub mod check;

use anyhow::{Context, Result};
use beanbook_ledger::Evaluation;
use beanbook_loader::{LoadResult, Loader};
use std::path::Path;
use tracing::debug;

/// Load and evaluate a ledger file.
pub fn load_and_evaluate(file: &Path) -> Result<(LoadResult, Evaluation)> {
    let mut loader = Loader::new();
    let loaded = loader
        .load(file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    debug!(
        directives = loaded.directives.len(),
        errors = loaded.errors.len(),
        "loaded ledger"
    );

    let evaluation = beanbook_ledger::evaluate(&loaded.directives);
    debug!(errors = evaluation.errors.len(), "evaluated ledger");
    Ok((loaded, evaluation))
}
