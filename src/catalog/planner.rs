use super::assets::AssetGroup;
use super::category::{CanonicalCategory, CatalogTaxonomy, CategoryRule};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Lowest generated list price
pub const PRICE_MIN: i64 = 1_000;
/// Generated list prices stay below this value
pub const PRICE_MAX_EXCLUSIVE: i64 = 91_000;
/// Selling price ratio bounds (10-40% discount)
pub const SELLING_RATIO_MIN: f64 = 0.6;
pub const SELLING_RATIO_MAX: f64 = 0.9;

/// A product waiting to be committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductDraft {
    pub product_name: String,
    pub brand_name: String,
    pub category: CanonicalCategory,
    pub product_image: Vec<String>,
    pub description: String,
    pub price: i64,
    pub selling_price: i64,
}

/// Products queued for insertion during one run.
#[derive(Clone, Debug, Default)]
pub struct InsertQueue {
    drafts: Vec<ProductDraft>,
    names: HashSet<String>,
    per_category: HashMap<CanonicalCategory, u64>,
}

impl InsertQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a draft. Name collisions are kept; the commit step skips them.
    pub fn push(&mut self, draft: ProductDraft) {
        self.names.insert(draft.product_name.clone());
        *self.per_category.entry(draft.category.clone()).or_insert(0) += 1;
        self.drafts.push(draft);
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn queued_for(&self, category: &CanonicalCategory) -> u64 {
        self.per_category.get(category).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn drafts(&self) -> &[ProductDraft] {
        &self.drafts
    }

    pub fn into_drafts(self) -> Vec<ProductDraft> {
        self.drafts
    }
}

/// What happened to one category with a target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryOutcome {
    AlreadyMet,
    MissingAssets { needed: u64 },
    NoImages { folder: String, needed: u64 },
    Generated { folder: String, added: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryPlan {
    pub category: CanonicalCategory,
    pub target: u64,
    pub in_store: u64,
    pub queued_before: u64,
    pub outcome: CategoryOutcome,
}

impl CategoryPlan {
    pub fn existing(&self) -> u64 {
        self.in_store + self.queued_before
    }

    pub fn added(&self) -> u64 {
        match self.outcome {
            CategoryOutcome::Generated { added, .. } => added,
            _ => 0,
        }
    }
}

/// Image file name without extension, with `_`/`-` runs turned into single
/// spaces and surrounding whitespace removed.
pub fn derive_base_name(file_name: &str) -> String {
    let stem = std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let mut name = String::with_capacity(stem.len());
    let mut in_separator = false;
    for ch in stem.chars() {
        if ch == '_' || ch == '-' {
            if !in_separator {
                name.push(' ');
                in_separator = true;
            }
        } else {
            name.push(ch);
            in_separator = false;
        }
    }
    name.trim().to_string()
}

/// Characters left as-is in a URI component: alphanumerics and `-_.!~*'()`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes one path segment the way browsers encode a URI
/// component; spaces become `%20`.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, URI_COMPONENT).to_string()
}

pub fn image_path(prefix: &str, folder: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        prefix.trim_end_matches('/'),
        folder,
        encode_segment(file_name)
    )
}

/// Draws `(price, selling_price)` with `selling_price = floor(price * r)`,
/// `r` uniform in `[0.6, 0.9]`.
pub fn sample_prices<R: Rng + ?Sized>(rng: &mut R) -> (i64, i64) {
    let price = rng.gen_range(PRICE_MIN..PRICE_MAX_EXCLUSIVE);
    let ratio = rng.gen_range(SELLING_RATIO_MIN..=SELLING_RATIO_MAX);
    let selling_price = (price as f64 * ratio).floor() as i64;
    (price, selling_price)
}

/// Turns discovered assets and store counts into product drafts.
///
/// Holds no store handle: every count it needs is passed in, so plans can be
/// computed and checked without a database or a filesystem.
#[derive(Clone, Debug)]
pub struct CatalogPlanner<'a> {
    taxonomy: &'a CatalogTaxonomy,
    asset_url_prefix: String,
}

impl<'a> CatalogPlanner<'a> {
    pub fn new(taxonomy: &'a CatalogTaxonomy, asset_url_prefix: impl Into<String>) -> Self {
        Self {
            taxonomy,
            asset_url_prefix: asset_url_prefix.into(),
        }
    }

    pub fn taxonomy(&self) -> &CatalogTaxonomy {
        self.taxonomy
    }

    /// Queues one product per image across all groups, looking at no more than
    /// `limit` images in total. Images whose name is already in the store or
    /// already queued use up their slot without being queued, so the same
    /// asset tree always yields the same candidates.
    ///
    /// Returns the number of drafts added.
    pub fn plan_initial_scan<R, I>(
        &self,
        groups: I,
        known_names: &HashSet<String>,
        limit: usize,
        queue: &mut InsertQueue,
        rng: &mut R,
    ) -> usize
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = AssetGroup>,
    {
        let mut added = 0;
        let mut scanned = 0;

        'groups: for group in groups {
            if scanned >= limit {
                break;
            }
            let category = self.taxonomy.normalize(&group.folder);
            let fallback = self
                .taxonomy
                .rule(category.as_str())
                .map(CategoryRule::fallback)
                .unwrap_or_else(|| category.title_case());

            for file in &group.files {
                if scanned >= limit {
                    break 'groups;
                }
                scanned += 1;
                let mut name = derive_base_name(file);
                if name.is_empty() {
                    name = fallback.clone();
                }
                if known_names.contains(&name) || queue.contains_name(&name) {
                    debug!(product = %name, "Product already present, not queued");
                    continue;
                }

                let (price, selling_price) = sample_prices(rng);
                queue.push(ProductDraft {
                    description: format!("Sample {} - {}", category, name),
                    product_name: name,
                    brand_name: category.title_case(),
                    category: category.clone(),
                    product_image: vec![image_path(&self.asset_url_prefix, &group.folder, file)],
                    price,
                    selling_price,
                });
                added += 1;
            }
        }

        added
    }

    /// Tops one category up to `target`.
    ///
    /// `in_store` is the persisted count after normalization; drafts already
    /// queued for the category count toward the target as well.
    pub fn plan_category<R: Rng + ?Sized>(
        &self,
        rule: &CategoryRule,
        target: u64,
        in_store: u64,
        group: Option<&AssetGroup>,
        queue: &mut InsertQueue,
        rng: &mut R,
    ) -> CategoryPlan {
        let category = rule.canonical();
        let queued_before = queue.queued_for(&category);
        let existing = in_store + queued_before;

        let plan = |outcome| CategoryPlan {
            category: category.clone(),
            target,
            in_store,
            queued_before,
            outcome,
        };

        if existing >= target {
            return plan(CategoryOutcome::AlreadyMet);
        }
        let needed = target - existing;

        let Some(group) = group else {
            return plan(CategoryOutcome::MissingAssets { needed });
        };
        if group.files.is_empty() {
            return plan(CategoryOutcome::NoImages {
                folder: group.folder.clone(),
                needed,
            });
        }

        let segment = rule.asset_segment.as_deref().unwrap_or(&group.folder);
        let brand = rule.brand();
        let fallback = rule.fallback();

        for i in 0..needed {
            let file = &group.files[(i as usize) % group.files.len()];
            let mut base = derive_base_name(file);
            if base.is_empty() {
                base = fallback.clone();
            }
            let product_name = format!("{} {}", base, existing + i + 1);
            let (price, selling_price) = sample_prices(rng);

            queue.push(ProductDraft {
                description: rule.description_for(&product_name),
                product_name,
                brand_name: brand.clone(),
                category: category.clone(),
                product_image: vec![image_path(&self.asset_url_prefix, segment, file)],
                price,
                selling_price,
            });
        }

        plan(CategoryOutcome::Generated {
            folder: group.folder.clone(),
            added: needed,
        })
    }
}
