mod common;

use chrono::Utc;
use common::TestCatalog;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, PaginatorTrait, Set};
use storefront_catalog::{
    config::AdminSeedConfig,
    entities::{cart_item, user},
    services::{clean_database, verify_password, AdminSeedOutcome, AdminService},
};
use uuid::Uuid;

#[tokio::test]
async fn admin_seeding_is_idempotent() {
    let catalog = TestCatalog::new().await;
    let service = AdminService::new(catalog.pool.clone(), AdminSeedConfig::default());

    assert_eq!(service.ensure_admin().await.unwrap(), AdminSeedOutcome::Created);
    assert_eq!(service.ensure_admin().await.unwrap(), AdminSeedOutcome::Unchanged);

    let admin = service.find_admin().await.unwrap().unwrap();
    assert_eq!(admin.role, user::ROLE_ADMIN);
    assert_eq!(admin.name, "Admin");
    assert!(admin.profile_pic.is_some());
    assert!(verify_password("Admin123!", &admin.password).unwrap());
    assert_eq!(user::Entity::find().count(&*catalog.pool).await.unwrap(), 1);
}

#[tokio::test]
async fn missing_profile_picture_is_filled_in() {
    let catalog = TestCatalog::new().await;
    let service = AdminService::new(catalog.pool.clone(), AdminSeedConfig::default());
    service.ensure_admin().await.unwrap();

    let mut admin = service
        .find_admin()
        .await
        .unwrap()
        .unwrap()
        .into_active_model();
    admin.profile_pic = Set(None);
    admin.update(&*catalog.pool).await.unwrap();

    assert_eq!(
        service.ensure_admin().await.unwrap(),
        AdminSeedOutcome::ProfilePicSet
    );
    let admin = service.find_admin().await.unwrap().unwrap();
    assert_eq!(admin.profile_pic, AdminSeedConfig::default().profile_pic);
}

#[tokio::test]
async fn password_reset_rehashes_the_configured_password() {
    let catalog = TestCatalog::new().await;
    let initial = AdminService::new(catalog.pool.clone(), AdminSeedConfig::default());
    assert!(!initial.reset_password().await.unwrap());
    initial.ensure_admin().await.unwrap();

    let rotated = AdminService::new(
        catalog.pool.clone(),
        AdminSeedConfig {
            password: "rotated-secret".into(),
            ..AdminSeedConfig::default()
        },
    );
    assert!(rotated.reset_password().await.unwrap());

    let admin = rotated.find_admin().await.unwrap().unwrap();
    assert!(verify_password("rotated-secret", &admin.password).unwrap());
    assert!(!verify_password("Admin123!", &admin.password).unwrap());
}

#[tokio::test]
async fn cleaning_removes_seeded_data_only() {
    let catalog = TestCatalog::new().await;
    catalog.insert_products("cam", "camera", 3).await;

    let admin_cfg = AdminSeedConfig::default();
    let service = AdminService::new(catalog.pool.clone(), admin_cfg.clone());
    service.ensure_admin().await.unwrap();
    let admin = service.find_admin().await.unwrap().unwrap();

    let shopper = user::ActiveModel {
        name: Set("Shopper".into()),
        email: Set("shopper@example.com".into()),
        password: Set("x".into()),
        ..Default::default()
    }
    .insert(&*catalog.pool)
    .await
    .unwrap();
    assert_eq!(shopper.role, user::ROLE_GENERAL);

    let product = catalog.repo.find_by_name("cam legacy 0").await.unwrap().unwrap();
    cart_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        user_id: Set(admin.id),
        quantity: Set(2),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(&*catalog.pool)
    .await
    .unwrap();

    let summary = clean_database(catalog.pool.clone(), &admin_cfg.email)
        .await
        .unwrap();

    assert_eq!(summary.products, 3);
    assert_eq!(summary.cart_items, 1);
    assert_eq!(summary.admin_users, 1);
    assert_eq!(catalog.repo.count_all().await.unwrap(), 0);
    let users = user::Entity::find().all(&*catalog.pool).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "shopper@example.com");
}
