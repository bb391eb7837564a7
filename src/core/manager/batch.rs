//! Bulk operations. One failing item never stops the rest.

use std::path::Path;

use tracing::{info, warn};

use super::{canonical_reference, ConfigManager};
use crate::core::domain::BatchSummary;
use crate::core::ingest::LegacyIngestor;
use crate::core::slug::slugify;
use crate::core::vault::Access;
use crate::error::Result;

impl ConfigManager {
    /// Re-save every account in every vault.
    ///
    /// Plaintext records are migrated to encrypted storage on the way.
    /// Accounts that cannot be read are reported as failures.
    pub fn encrypt_all(&mut self) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for vault_slug in self.vault_slugs() {
            let Ok(vault) = self.vault_mut(&vault_slug) else {
                continue;
            };
            let slugs = match vault.slugs() {
                Ok(slugs) => slugs,
                Err(e) => {
                    summary.fail(vault_slug.clone(), e);
                    continue;
                }
            };

            for slug in slugs {
                let reference = canonical_reference(&vault_slug, &slug);
                let result = vault
                    .get(&slug, Access::Metadata)
                    .and_then(|mut account| vault.save(&mut account));
                match result {
                    Ok(()) => summary.success(),
                    Err(e) => {
                        warn!(account = %reference, error = %e, "re-encryption failed");
                        summary.fail(reference, e);
                    }
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "re-encrypted accounts"
        );
        summary
    }

    /// Import every account the legacy ingestor finds under `path` into the
    /// personal vault.
    ///
    /// Accounts that already exist are skipped unless `overwrite` is set.
    ///
    /// # Errors
    ///
    /// Returns a `LegacyError` if `path` is not a legacy layout. Per-account
    /// failures are recorded in the summary instead.
    pub fn ingest(&mut self, path: &Path, overwrite: bool) -> Result<BatchSummary> {
        let scan = LegacyIngestor::new().scan(path)?;
        let mut summary = BatchSummary::default();

        for mut account in scan {
            let slug = slugify(account.name());
            if !overwrite && self.personal.contains(&slug) {
                info!(account = %slug, "already exists, skipping");
                summary.skip();
                continue;
            }
            match self.personal.save(&mut account) {
                Ok(()) => summary.success(),
                Err(e) => {
                    warn!(account = %slug, error = %e, "import failed");
                    summary.fail(slug, e);
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed,
            "ingested legacy accounts"
        );
        Ok(summary)
    }
}
