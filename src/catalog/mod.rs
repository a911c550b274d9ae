//! Catalog planning: category normalization, asset discovery and the
//! per-category top-up planner. Nothing in here touches the database.

pub mod assets;
pub mod category;
pub mod planner;

pub use assets::{is_image_file, AssetCatalog, AssetGroup, AssetGroups, IMAGE_EXTENSIONS};
pub use category::{CanonicalCategory, CatalogTaxonomy, CategoryRule};
pub use planner::{
    derive_base_name, image_path, sample_prices, CatalogPlanner, CategoryOutcome, CategoryPlan,
    InsertQueue, ProductDraft,
};
