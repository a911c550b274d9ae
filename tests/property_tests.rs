//! Property-based tests for category normalization and product generation.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use storefront_catalog::catalog::{
    derive_base_name, sample_prices, AssetGroup, CatalogPlanner, CatalogTaxonomy, InsertQueue,
};

fn alias_strategy() -> impl Strategy<Value = String> {
    let aliases: Vec<String> = CatalogTaxonomy::storefront_default()
        .alias_pairs()
        .into_iter()
        .map(|(alias, _)| alias.to_string())
        .collect();
    prop::sample::select(aliases)
}

fn file_name_strategy() -> impl Strategy<Value = String> {
    ("[A-Za-z0-9 _-]{0,16}", prop_oneof!["png", "jpg", "webp", "GIF"])
        .prop_map(|(stem, ext)| format!("{}.{}", stem, ext))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn aliases_resolve_and_stay_resolved(alias in alias_strategy()) {
        let taxonomy = CatalogTaxonomy::storefront_default();
        let canonical = taxonomy.normalize(&alias);

        prop_assert!(taxonomy.rule(canonical.as_str()).is_some());
        prop_assert_eq!(taxonomy.normalize(canonical.as_str()), canonical.clone());
    }

    #[test]
    fn unknown_labels_are_lower_cased(label in "[A-Za-z ]{1,20}") {
        let taxonomy = CatalogTaxonomy::storefront_default();
        prop_assume!(!taxonomy.is_alias(&label) && taxonomy.rule(&label).is_none());

        let normalized = taxonomy.normalize(&label);
        prop_assert_eq!(normalized.as_str(), label.to_lowercase());
    }

    #[test]
    fn prices_respect_discount_bounds(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let (price, selling) = sample_prices(&mut rng);

        prop_assert!((1_000..91_000).contains(&price));
        prop_assert!(selling <= price);
        prop_assert!(selling >= (price as f64 * 0.6).floor() as i64);
    }

    #[test]
    fn base_names_have_no_separator_runs(file in file_name_strategy()) {
        let name = derive_base_name(&file);

        prop_assert!(!name.contains('_') && !name.contains('-'));
        prop_assert_eq!(name.trim(), name.as_str());
    }

    #[test]
    fn top_up_fills_exactly_the_gap(
        in_store in 0u64..60,
        files in prop::collection::vec(file_name_strategy(), 1..5),
    ) {
        let taxonomy = CatalogTaxonomy::storefront_default();
        let planner = CatalogPlanner::new(&taxonomy, "/assets/products");
        let rule = taxonomy.rule("watches").unwrap();
        let group = AssetGroup::new("watches", files.clone());
        let mut queue = InsertQueue::new();

        let plan = planner.plan_category(
            rule, 50, in_store, Some(&group), &mut queue, &mut StdRng::seed_from_u64(0),
        );

        prop_assert_eq!(plan.added(), 50u64.saturating_sub(in_store));
        prop_assert_eq!(queue.len() as u64, plan.added());
        for (i, draft) in queue.drafts().iter().enumerate() {
            let suffix = format!(" {}", in_store + i as u64 + 1);
            prop_assert!(draft.product_name.ends_with(&suffix));
            let file = &files[i % files.len()];
            prop_assert!(draft.product_image[0].starts_with("/assets/products/watches/"));
            prop_assert!(!draft.product_image[0].contains(' '), "unencoded path for {}", file);
        }
    }
}
