use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::catalog::ProductDraft;
use crate::entities::product::{
    ActiveModel as ProductActiveModel, Column, Entity as Product, Model as ProductModel,
    ProductImages,
};
use crate::errors::SeedError;
use crate::repositories::{ProductStore, Repository};

use super::BaseRepository;

/// Product persistence backed by sea-orm
#[derive(Debug, Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find a product by its unique name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<ProductModel>, SeedError> {
        Product::find()
            .filter(Column::ProductName.eq(name))
            .one(self.base.get_db())
            .await
            .map_err(SeedError::DatabaseError)
    }

    /// Find all products in a category
    pub async fn find_by_category(&self, category: &str) -> Result<Vec<ProductModel>, SeedError> {
        Product::find()
            .filter(Column::Category.eq(category))
            .all(self.base.get_db())
            .await
            .map_err(SeedError::DatabaseError)
    }

    /// Total number of products
    pub async fn count_all(&self) -> Result<u64, SeedError> {
        Product::find()
            .count(self.base.get_db())
            .await
            .map_err(SeedError::DatabaseError)
    }

    /// Delete every product, returning the number removed
    pub async fn delete_all(&self) -> Result<u64, SeedError> {
        let result = Product::delete_many()
            .exec(self.base.get_db())
            .await
            .map_err(SeedError::DatabaseError)?;
        Ok(result.rows_affected)
    }
}

fn draft_to_model(draft: &ProductDraft) -> ProductModel {
    let now = Utc::now();
    ProductModel {
        id: Uuid::new_v4(),
        product_name: draft.product_name.clone(),
        brand_name: draft.brand_name.clone(),
        category: draft.category.as_str().to_string(),
        product_image: ProductImages(draft.product_image.clone()),
        description: draft.description.clone(),
        price: draft.price,
        selling_price: draft.selling_price,
        created_at: now,
        updated_at: now,
    }
}

fn to_active_model(model: ProductModel) -> ProductActiveModel {
    ProductActiveModel {
        id: Set(model.id),
        product_name: Set(model.product_name),
        brand_name: Set(model.brand_name),
        category: Set(model.category),
        product_image: Set(model.product_image),
        description: Set(model.description),
        price: Set(model.price),
        selling_price: Set(model.selling_price),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn count_by_category(&self, category: &str) -> Result<u64, SeedError> {
        Product::find()
            .filter(Column::Category.eq(category))
            .count(self.base.get_db())
            .await
            .map_err(SeedError::DatabaseError)
    }

    #[instrument(skip(self))]
    async fn rename_category(&self, alias: &str, canonical: &str) -> Result<u64, SeedError> {
        let result = Product::update_many()
            .col_expr(Column::Category, Expr::value(canonical.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Category.eq(alias))
            .exec(self.base.get_db())
            .await
            .map_err(SeedError::DatabaseError)?;

        if result.rows_affected > 0 {
            counter!("storefront_catalog.products.renamed", result.rows_affected);
        }
        Ok(result.rows_affected)
    }

    async fn product_names(&self) -> Result<HashSet<String>, SeedError> {
        let names: Vec<String> = Product::find()
            .select_only()
            .column(Column::ProductName)
            .into_tuple()
            .all(self.base.get_db())
            .await
            .map_err(SeedError::DatabaseError)?;
        Ok(names.into_iter().collect())
    }

    async fn insert_if_absent(&self, draft: &ProductDraft) -> Result<bool, SeedError> {
        let model = draft_to_model(draft);
        model.validate()?;

        let rows = Product::insert(to_active_model(model))
            .on_conflict(
                OnConflict::column(Column::ProductName)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.base.get_db())
            .await
            .map_err(SeedError::DatabaseError)?;

        if rows > 0 {
            counter!("storefront_catalog.products.inserted", 1);
            Ok(true)
        } else {
            debug!(product = %draft.product_name, "Product name already taken");
            counter!("storefront_catalog.products.skipped", 1);
            Ok(false)
        }
    }
}
