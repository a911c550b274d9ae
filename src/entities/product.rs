use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Image paths attached to a product, stored as a JSON array
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ProductImages(pub Vec<String>);

/// Product entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product name, unique across the catalog
    #[sea_orm(unique)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub product_name: String,

    /// Brand shown on the storefront
    #[validate(length(max = 255, message = "Brand name cannot exceed 255 characters"))]
    pub brand_name: String,

    /// Canonical category name
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: String,

    /// Image paths served by the frontend
    #[sea_orm(column_type = "Json")]
    pub product_image: ProductImages,

    #[sea_orm(column_type = "Text")]
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: String,

    /// List price in whole currency units
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,

    /// Discounted price in whole currency units
    #[validate(range(min = 0, message = "Selling price cannot be negative"))]
    pub selling_price: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
