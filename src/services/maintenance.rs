use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use serde::Serialize;
use tracing::info;

use crate::{
    db::DbPool,
    entities::{cart_item, product, user},
    errors::SeedError,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub cart_items: u64,
    pub products: u64,
    pub admin_users: u64,
}

/// Removes all cart items, all products and the admin account in one
/// transaction. Other users are left alone.
pub async fn clean_database(db_pool: Arc<DbPool>, admin_email: &str) -> Result<CleanSummary, SeedError> {
    let txn = db_pool.begin().await?;

    let cart_items = cart_item::Entity::delete_many().exec(&txn).await?.rows_affected;
    let products = product::Entity::delete_many().exec(&txn).await?.rows_affected;
    let admin_users = user::Entity::delete_many()
        .filter(user::Column::Email.eq(admin_email))
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;

    info!(
        cart_items,
        products,
        admin_users,
        "Database cleaned"
    );

    Ok(CleanSummary {
        cart_items,
        products,
        admin_users,
    })
}
