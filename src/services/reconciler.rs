use std::sync::Arc;

use metrics::counter;
use rand::Rng;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    catalog::{
        AssetCatalog, CanonicalCategory, CatalogPlanner, CatalogTaxonomy, CategoryOutcome,
        CategoryPlan, InsertQueue,
    },
    config::SeedConfig,
    errors::SeedError,
    repositories::ProductStore,
};

/// One alias folded into its canonical category by the normalization pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryRename {
    pub alias: String,
    pub canonical: CanonicalCategory,
    pub rows: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub inserted: u64,
    pub skipped: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Persisted counts per reported category, read after the commit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub counts: Vec<CategoryCount>,
}

impl VerificationReport {
    pub fn count(&self, category: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.count)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.count).sum()
    }
}

/// Everything one planning pass decided, before anything is written.
#[derive(Debug, Default)]
pub struct ReconciliationPlan {
    pub initial_scanned: usize,
    pub categories: Vec<CategoryPlan>,
    pub queue: InsertQueue,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RunSummary {
    pub renamed: Vec<CategoryRename>,
    pub initial_scanned: usize,
    pub categories: Vec<CategoryPlan>,
    pub commit: CommitSummary,
    pub report: VerificationReport,
}

impl RunSummary {
    pub fn renamed_rows(&self) -> u64 {
        self.renamed.iter().map(|r| r.rows).sum()
    }
}

/// Brings the product catalog up to the per-category targets.
///
/// Steps run strictly in order: normalization, planning (initial scan and
/// per-category top-up), commit, verification. Each step is idempotent, so a
/// failed run can be repeated from the start.
pub struct CatalogReconciler {
    store: Arc<dyn ProductStore>,
    taxonomy: CatalogTaxonomy,
    assets: AssetCatalog,
    asset_url_prefix: String,
    initial_scan_limit: usize,
    report_categories: Vec<String>,
}

impl CatalogReconciler {
    pub fn new(
        store: Arc<dyn ProductStore>,
        taxonomy: CatalogTaxonomy,
        assets: AssetCatalog,
    ) -> Self {
        let report_categories = taxonomy.canonical_names();
        Self {
            store,
            taxonomy,
            assets,
            asset_url_prefix: "/assets/products".to_string(),
            initial_scan_limit: 200,
            report_categories,
        }
    }

    /// Builds a reconciler from loaded configuration.
    pub fn from_config(store: Arc<dyn ProductStore>, cfg: &SeedConfig) -> Result<Self, SeedError> {
        let taxonomy = cfg.taxonomy()?;
        let report_categories = cfg.report_categories(&taxonomy);
        Ok(Self::new(store, taxonomy, AssetCatalog::new(&cfg.asset_root))
            .with_asset_url_prefix(cfg.asset_url_prefix.clone())
            .with_initial_scan_limit(cfg.initial_scan_limit)
            .with_report_categories(report_categories))
    }

    pub fn with_asset_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.asset_url_prefix = prefix.into();
        self
    }

    pub fn with_initial_scan_limit(mut self, limit: usize) -> Self {
        self.initial_scan_limit = limit;
        self
    }

    pub fn with_report_categories(mut self, categories: Vec<String>) -> Self {
        self.report_categories = categories;
        self
    }

    pub fn taxonomy(&self) -> &CatalogTaxonomy {
        &self.taxonomy
    }

    /// Runs every step in order.
    #[instrument(skip_all, fields(asset_root = %self.assets.root().display()))]
    pub async fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RunSummary, SeedError> {
        let renamed = self.normalize_store().await?;
        let plan = self.plan(rng).await?;
        let commit = self.commit(&plan.queue).await?;
        let report = self.verify().await?;

        info!(
            renamed = renamed.iter().map(|r| r.rows).sum::<u64>(),
            inserted = commit.inserted,
            skipped = commit.skipped,
            "Catalog reconciliation finished"
        );

        Ok(RunSummary {
            renamed,
            initial_scanned: plan.initial_scanned,
            categories: plan.categories,
            commit,
            report,
        })
    }

    /// Folds every alias category in the store into its canonical name.
    pub async fn normalize_store(&self) -> Result<Vec<CategoryRename>, SeedError> {
        let mut renamed = Vec::new();

        for (alias, canonical) in self.taxonomy.alias_pairs() {
            let rows = self
                .store
                .rename_category(alias, canonical.as_str())
                .await?;
            if rows > 0 {
                info!(
                    alias,
                    canonical = %canonical,
                    rows,
                    "Normalized {} products from '{}' to '{}'",
                    rows,
                    alias,
                    canonical
                );
                renamed.push(CategoryRename {
                    alias: alias.to_string(),
                    canonical,
                    rows,
                });
            }
        }

        Ok(renamed)
    }

    /// Computes the insert queue from the current store counts and assets.
    /// Reads the store but writes nothing.
    pub async fn plan<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<ReconciliationPlan, SeedError> {
        let planner = CatalogPlanner::new(&self.taxonomy, self.asset_url_prefix.clone());
        let mut queue = InsertQueue::new();

        let initial_scanned = if self.initial_scan_limit > 0 {
            let known = self.store.product_names().await?;
            let added = planner.plan_initial_scan(
                self.assets.groups(),
                &known,
                self.initial_scan_limit,
                &mut queue,
                rng,
            );
            info!(queued = added, "Initial catalog scan complete");
            added
        } else {
            0
        };

        let mut categories = Vec::new();
        for (rule, target) in self.taxonomy.rules_with_targets() {
            let in_store = self.store.count_by_category(&rule.name).await?;
            let group = self.assets.find_group(&rule.directories());
            let plan = planner.plan_category(rule, target, in_store, group.as_ref(), &mut queue, rng);
            log_category_plan(&plan);
            categories.push(plan);
        }

        Ok(ReconciliationPlan {
            initial_scanned,
            categories,
            queue,
        })
    }

    /// Writes every queued draft, skipping names that already exist.
    ///
    /// A draft the product model rejects is logged and skipped; only store
    /// failures abort the commit.
    pub async fn commit(&self, queue: &InsertQueue) -> Result<CommitSummary, SeedError> {
        let mut summary = CommitSummary::default();

        for draft in queue.drafts() {
            match self.store.insert_if_absent(draft).await {
                Ok(true) => summary.inserted += 1,
                Ok(false) => summary.skipped += 1,
                Err(SeedError::ValidationError(reason)) => {
                    warn!(
                        product = %draft.product_name,
                        category = %draft.category,
                        %reason,
                        "Skipping invalid product"
                    );
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        counter!("storefront_catalog.commit.runs", 1);
        info!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            "Committed queued products"
        );
        Ok(summary)
    }

    /// Re-reads the persisted count of every reported category.
    pub async fn verify(&self) -> Result<VerificationReport, SeedError> {
        let mut report = VerificationReport::default();

        for category in &self.report_categories {
            let count = self.store.count_by_category(category).await?;
            if count > 0 {
                info!(category = %category, count, "{}: {} products", category, count);
            }
            report.counts.push(CategoryCount {
                category: category.clone(),
                count,
            });
        }

        Ok(report)
    }
}

fn log_category_plan(plan: &CategoryPlan) {
    let category = plan.category.as_str();
    match &plan.outcome {
        CategoryOutcome::AlreadyMet => info!(
            category,
            existing = plan.existing(),
            target = plan.target,
            "{} already meet target ({}/{})",
            category,
            plan.existing(),
            plan.target
        ),
        CategoryOutcome::MissingAssets { needed } => warn!(
            category,
            needed,
            "No asset directory found for {}, skipping",
            category
        ),
        CategoryOutcome::NoImages { folder, needed } => warn!(
            category,
            folder = %folder,
            needed,
            "No images in {} for {}, skipping",
            folder,
            category
        ),
        CategoryOutcome::Generated { folder, added } => info!(
            category,
            folder = %folder,
            added,
            target = plan.target,
            "Queued {} {} products from {}",
            added,
            category,
            folder
        ),
    }
}
