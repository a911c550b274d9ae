use crate::errors::SeedError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use validator::Validate;

/// The single authoritative spelling of a product category.
///
/// Comparison is case-sensitive: `Mouse` and `mouse` are different values, and
/// only the former is canonical in the default storefront taxonomy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalCategory(String);

impl CanonicalCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First character upper-cased, the rest untouched (`mobiles` -> `Mobiles`).
    pub fn title_case(&self) -> String {
        title_case(&self.0)
    }
}

impl fmt::Display for CanonicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalCategory {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CanonicalCategory {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonicalCategory {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

pub(crate) fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything the seeder knows about one canonical category.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CategoryRule {
    /// Canonical category name as stored on products
    #[validate(length(min = 1, message = "category name cannot be empty"))]
    pub name: String,

    /// Raw or legacy labels that mean this category
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Minimum number of products the catalog should hold
    #[serde(default)]
    pub target_count: Option<u64>,

    /// Asset directory names to look for, in order of preference
    #[serde(default)]
    pub directory_candidates: Vec<String>,

    /// Brand written on synthesized products (defaults to the title-cased name)
    #[serde(default)]
    pub brand_name: Option<String>,

    /// Product name used when an image file name yields nothing usable
    #[serde(default)]
    pub fallback_name: Option<String>,

    /// Leading part of generated descriptions (defaults to `Sample {name}`)
    #[serde(default)]
    pub description_prefix: Option<String>,

    /// Path segment used in image URLs; the discovered directory name when unset
    #[serde(default)]
    pub asset_segment: Option<String>,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            target_count: None,
            directory_candidates: Vec::new(),
            brand_name: None,
            fallback_name: None,
            description_prefix: None,
            asset_segment: None,
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_target(mut self, target: u64) -> Self {
        self.target_count = Some(target);
        self
    }

    pub fn with_directories(mut self, dirs: &[&str]) -> Self {
        self.directory_candidates = dirs.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand_name = Some(brand.to_string());
        self
    }

    pub fn with_fallback_name(mut self, fallback: &str) -> Self {
        self.fallback_name = Some(fallback.to_string());
        self
    }

    pub fn with_description_prefix(mut self, prefix: &str) -> Self {
        self.description_prefix = Some(prefix.to_string());
        self
    }

    pub fn with_asset_segment(mut self, segment: &str) -> Self {
        self.asset_segment = Some(segment.to_string());
        self
    }

    pub fn canonical(&self) -> CanonicalCategory {
        CanonicalCategory::new(self.name.clone())
    }

    pub fn brand(&self) -> String {
        self.brand_name
            .clone()
            .unwrap_or_else(|| title_case(&self.name))
    }

    pub fn fallback(&self) -> String {
        self.fallback_name
            .clone()
            .unwrap_or_else(|| title_case(&self.name))
    }

    pub fn description_for(&self, product_name: &str) -> String {
        match &self.description_prefix {
            Some(prefix) => format!("{} - {}", prefix, product_name),
            None => format!("Sample {} - {}", self.name, product_name),
        }
    }

    /// Directory names to probe; the canonical name alone when none are configured.
    pub fn directories(&self) -> Vec<&str> {
        if self.directory_candidates.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.directory_candidates.iter().map(String::as_str).collect()
        }
    }
}

/// The configured category set with its alias table.
#[derive(Clone, Debug)]
pub struct CatalogTaxonomy {
    rules: Vec<CategoryRule>,
    index: HashMap<String, usize>,
}

impl CatalogTaxonomy {
    /// Builds the taxonomy and its lookup table.
    ///
    /// Fails when a canonical name repeats or when one label would resolve to
    /// two different categories.
    pub fn new(rules: Vec<CategoryRule>) -> Result<Self, SeedError> {
        let mut index: HashMap<String, usize> = HashMap::new();

        for (position, rule) in rules.iter().enumerate() {
            rule.validate()?;
            if index.insert(rule.name.clone(), position).is_some() {
                return Err(SeedError::ValidationError(format!(
                    "category '{}' is declared twice",
                    rule.name
                )));
            }
        }

        for (position, rule) in rules.iter().enumerate() {
            for alias in &rule.aliases {
                match index.get(alias) {
                    Some(&existing) if existing != position => {
                        return Err(SeedError::ValidationError(format!(
                            "alias '{}' maps to both '{}' and '{}'",
                            alias, rules[existing].name, rule.name
                        )));
                    }
                    Some(_) => {}
                    None => {
                        index.insert(alias.clone(), position);
                    }
                }
            }
        }

        Ok(Self { rules, index })
    }

    /// The category set served by the storefront frontend.
    pub fn storefront_default() -> Self {
        Self::new(default_rules()).expect("built-in storefront taxonomy is consistent")
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn rule(&self, canonical: &str) -> Option<&CategoryRule> {
        self.rules.iter().find(|rule| rule.name == canonical)
    }

    /// Rules that carry a minimum product count, in declaration order.
    pub fn rules_with_targets(&self) -> impl Iterator<Item = (&CategoryRule, u64)> {
        self.rules
            .iter()
            .filter_map(|rule| rule.target_count.map(|target| (rule, target)))
    }

    /// Maps a raw label to its canonical category.
    ///
    /// Exact (case-sensitive) alias or canonical match first; anything else is
    /// accepted as a new category in lower case.
    pub fn normalize(&self, raw: &str) -> CanonicalCategory {
        match self.index.get(raw) {
            Some(&position) => self.rules[position].canonical(),
            None => CanonicalCategory::new(raw.to_lowercase()),
        }
    }

    pub fn is_alias(&self, raw: &str) -> bool {
        self.index
            .get(raw)
            .map(|&position| self.rules[position].name != raw)
            .unwrap_or(false)
    }

    /// `(alias, canonical)` pairs for the store normalization pass.
    pub fn alias_pairs(&self) -> Vec<(&str, CanonicalCategory)> {
        self.rules
            .iter()
            .flat_map(|rule| {
                rule.aliases
                    .iter()
                    .filter(move |alias| alias.as_str() != rule.name)
                    .map(move |alias| (alias.as_str(), rule.canonical()))
            })
            .collect()
    }

    pub fn canonical_names(&self) -> Vec<String> {
        self.rules.iter().map(|rule| rule.name.clone()).collect()
    }
}

impl Default for CatalogTaxonomy {
    fn default() -> Self {
        Self::storefront_default()
    }
}

/// Targeted categories come first, in the order they are topped up. When two
/// categories generate the same product name the earlier one keeps it.
fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("watches")
            .with_target(50)
            .with_brand("Watches")
            .with_fallback_name("Watch")
            .with_asset_segment("watches"),
        CategoryRule::new("mobiles")
            .with_aliases(&["mobile", "Mobile", "Mobiles"])
            .with_target(100)
            .with_directories(&["mobiles", "mobile"])
            .with_fallback_name("Mobile")
            .with_asset_segment("mobile"),
        CategoryRule::new("Mouse")
            .with_aliases(&["mouse", "mice", "Mice"])
            .with_target(50)
            .with_directories(&["mice", "mouse"])
            .with_brand("Mouse")
            .with_asset_segment("mouse"),
        CategoryRule::new("televisions")
            .with_aliases(&["TV", "Televisions", "Television", "tv"])
            .with_target(50)
            .with_directories(&["TV", "tv", "television", "televisions", "TVs", "tvS"])
            .with_brand("Television")
            .with_fallback_name("Television")
            .with_description_prefix("Sample television"),
        CategoryRule::new("speakers")
            .with_aliases(&["Speakers", "Bluetooth Speakers", "speaker"])
            .with_target(50)
            .with_brand("Speakers")
            .with_fallback_name("Speaker")
            .with_description_prefix("Bluetooth Speakers")
            .with_asset_segment("speakers"),
        CategoryRule::new("camera")
            .with_target(30)
            .with_brand("Camera")
            .with_description_prefix("Camera & Photography")
            .with_asset_segment("camera"),
        CategoryRule::new("refrigerator")
            .with_aliases(&["Refrigerator"])
            .with_target(20)
            .with_brand("Refrigerator")
            .with_description_prefix("Refrigerator")
            .with_asset_segment("refrigerator"),
        CategoryRule::new("trimmers")
            .with_aliases(&["Trimmers"])
            .with_target(20)
            .with_brand("Trimmers")
            .with_fallback_name("Trimmer")
            .with_description_prefix("Trimmer")
            .with_asset_segment("trimmers"),
        CategoryRule::new("airpodes"),
        CategoryRule::new("earphones"),
        CategoryRule::new("printers"),
        CategoryRule::new("processor"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("TV", "televisions")]
    #[case("tv", "televisions")]
    #[case("Television", "televisions")]
    #[case("Bluetooth Speakers", "speakers")]
    #[case("mobile", "mobiles")]
    #[case("Mobiles", "mobiles")]
    #[case("mice", "Mouse")]
    #[case("Mice", "Mouse")]
    #[case("Mouse", "Mouse")]
    #[case("Refrigerator", "refrigerator")]
    fn aliases_resolve_to_canonical(#[case] raw: &str, #[case] expected: &str) {
        let taxonomy = CatalogTaxonomy::storefront_default();
        assert_eq!(taxonomy.normalize(raw), expected);
    }

    #[test]
    fn unknown_labels_fall_through_lower_cased() {
        let taxonomy = CatalogTaxonomy::storefront_default();
        assert_eq!(taxonomy.normalize("Gaming Consoles"), "gaming consoles");
        assert_eq!(taxonomy.normalize("earphones"), "earphones");
    }

    #[test]
    fn alias_lookup_is_case_sensitive() {
        let taxonomy = CatalogTaxonomy::storefront_default();
        // "MICE" is not in the table, so it is only lower-cased
        assert_eq!(taxonomy.normalize("MICE"), "mice");
        assert!(!taxonomy.is_alias("MICE"));
        assert!(taxonomy.is_alias("mice"));
        assert!(!taxonomy.is_alias("Mouse"));
    }

    #[test]
    fn alias_pairs_exclude_canonical_names() {
        let taxonomy = CatalogTaxonomy::storefront_default();
        let pairs = taxonomy.alias_pairs();
        assert_eq!(pairs.len(), 15);
        assert!(pairs.iter().all(|(alias, canonical)| canonical.as_str() != *alias));
        assert!(pairs.contains(&("TV", CanonicalCategory::new("televisions"))));
    }

    #[test]
    fn conflicting_aliases_are_rejected() {
        let rules = vec![
            CategoryRule::new("mobiles").with_aliases(&["phone"]),
            CategoryRule::new("tablets").with_aliases(&["phone"]),
        ];
        let err = CatalogTaxonomy::new(rules).unwrap_err();
        assert!(err.to_string().contains("alias 'phone'"));
    }

    #[test]
    fn duplicate_categories_are_rejected() {
        let rules = vec![CategoryRule::new("camera"), CategoryRule::new("camera")];
        assert!(CatalogTaxonomy::new(rules).is_err());
    }

    #[test]
    fn rule_defaults_follow_the_category_name() {
        let rule = CategoryRule::new("earphones");
        assert_eq!(rule.brand(), "Earphones");
        assert_eq!(rule.fallback(), "Earphones");
        assert_eq!(rule.description_for("Buds 3"), "Sample earphones - Buds 3");
        assert_eq!(rule.directories(), vec!["earphones"]);
    }

    #[test]
    fn targets_match_storefront_defaults() {
        let taxonomy = CatalogTaxonomy::storefront_default();
        let targets: HashMap<&str, u64> = taxonomy
            .rules_with_targets()
            .map(|(rule, target)| (rule.name.as_str(), target))
            .collect();
        assert_eq!(targets.len(), 8);
        assert_eq!(targets["watches"], 50);
        assert_eq!(targets["mobiles"], 100);
        assert_eq!(targets["Mouse"], 50);
        assert_eq!(targets["camera"], 30);
        assert_eq!(targets["trimmers"], 20);
    }

    #[test]
    fn targeted_categories_are_topped_up_in_storefront_order() {
        let taxonomy = CatalogTaxonomy::storefront_default();
        let order: Vec<&str> = taxonomy
            .rules_with_targets()
            .map(|(rule, _)| rule.name.as_str())
            .collect();
        assert_eq!(
            order,
            vec![
                "watches",
                "mobiles",
                "Mouse",
                "televisions",
                "speakers",
                "camera",
                "refrigerator",
                "trimmers"
            ]
        );
    }
}
