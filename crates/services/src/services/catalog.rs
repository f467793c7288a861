//! Catalog writes that touch more than one table and must not partially
//! apply.

use db::models::{
    collection::Collection,
    product::Product,
    product_variant::{ProductVariant, VariantInput},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("product not found")]
    ProductNotFound,
    #[error("collection not found")]
    CollectionNotFound,
}

pub struct CatalogService;

impl CatalogService {
    /// Replace a product's variants with the submitted set. The delete and
    /// the inserts share one transaction so a failed insert leaves the
    /// previous variants in place.
    pub async fn replace_variants(
        pool: &SqlitePool,
        product_id: Uuid,
        inputs: &[VariantInput],
    ) -> Result<Vec<ProductVariant>, CatalogError> {
        if Product::find_by_id(pool, product_id).await?.is_none() {
            return Err(CatalogError::ProductNotFound);
        }

        let mut tx = pool.begin().await?;
        ProductVariant::delete_by_product_id(&mut *tx, product_id).await?;

        let mut variants = Vec::with_capacity(inputs.len());
        for (position, input) in inputs.iter().enumerate() {
            let variant =
                ProductVariant::create(&mut *tx, product_id, input, position as i64).await?;
            variants.push(variant);
        }
        tx.commit().await?;

        info!(
            product_id = %product_id,
            count = variants.len(),
            "replaced product variants"
        );

        Ok(variants)
    }

    /// Replace a collection's membership with the submitted ordered product
    /// ids; link positions equal array index. Single transaction.
    pub async fn set_collection_products(
        pool: &SqlitePool,
        collection_id: Uuid,
        ordered_product_ids: &[Uuid],
    ) -> Result<Vec<Product>, CatalogError> {
        if Collection::find_by_id(pool, collection_id).await?.is_none() {
            return Err(CatalogError::CollectionNotFound);
        }

        let mut tx = pool.begin().await?;
        Collection::clear_products(&mut *tx, collection_id).await?;

        for (position, product_id) in ordered_product_ids.iter().enumerate() {
            if let Err(e) =
                Collection::link_product(&mut *tx, collection_id, *product_id, position as i64)
                    .await
            {
                return Err(match e {
                    sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                        CatalogError::ProductNotFound
                    }
                    other => CatalogError::Database(other),
                });
            }
        }
        tx.commit().await?;

        info!(
            collection_id = %collection_id,
            count = ordered_product_ids.len(),
            "rewrote collection membership"
        );

        Ok(Collection::products(pool, collection_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::DBService;
    use db::models::collection::CreateCollection;
    use db::models::product::CreateProduct;

    async fn seed_product(pool: &SqlitePool, name: &str) -> Product {
        Product::create(
            pool,
            &CreateProduct {
                category_id: None,
                name: name.to_string(),
                slug: None,
                description: None,
                price_cents: 1000,
                stock: None,
                image_path: None,
                is_active: None,
                is_featured: None,
            },
        )
        .await
        .unwrap()
    }

    fn variant_input(name: &str, price_cents: i64) -> VariantInput {
        VariantInput {
            name: name.to_string(),
            sku: None,
            price_cents,
            stock: None,
            is_default: None,
        }
    }

    #[tokio::test]
    async fn test_replace_variants_rewrites_set_in_order() {
        let db = DBService::new_in_memory().await.unwrap();
        let product = seed_product(&db.pool, "Olive Oil").await;

        CatalogService::replace_variants(
            &db.pool,
            product.id,
            &[variant_input("250ml", 650), variant_input("500ml", 1100)],
        )
        .await
        .unwrap();

        let replaced = CatalogService::replace_variants(
            &db.pool,
            product.id,
            &[variant_input("1l", 1900)],
        )
        .await
        .unwrap();

        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].name, "1l");
        assert_eq!(replaced[0].sort_order, 0);

        let stored = ProductVariant::find_by_product_id(&db.pool, product.id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_variants_unknown_product() {
        let db = DBService::new_in_memory().await.unwrap();
        let result =
            CatalogService::replace_variants(&db.pool, Uuid::new_v4(), &[variant_input("x", 1)])
                .await;
        assert!(matches!(result, Err(CatalogError::ProductNotFound)));
    }

    #[tokio::test]
    async fn test_set_collection_products_keeps_links_when_insert_fails() {
        let db = DBService::new_in_memory().await.unwrap();

        let collection = Collection::create(
            &db.pool,
            &CreateCollection {
                title: "Summer Picks".to_string(),
                slug: None,
                description: None,
                is_active: None,
            },
        )
        .await
        .unwrap();

        let a = seed_product(&db.pool, "A").await;
        let b = seed_product(&db.pool, "B").await;

        CatalogService::set_collection_products(&db.pool, collection.id, &[a.id, b.id])
            .await
            .unwrap();

        // Second rewrite names a product that does not exist: the whole
        // rewrite must roll back, leaving the original two links intact.
        let result = CatalogService::set_collection_products(
            &db.pool,
            collection.id,
            &[b.id, Uuid::new_v4()],
        )
        .await;
        assert!(matches!(result, Err(CatalogError::ProductNotFound)));

        let products = Collection::products(&db.pool, collection.id).await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "A");
        assert_eq!(products[1].name, "B");
    }

    #[tokio::test]
    async fn test_set_collection_products_orders_by_position() {
        let db = DBService::new_in_memory().await.unwrap();

        let collection = Collection::create(
            &db.pool,
            &CreateCollection {
                title: "Staff Picks".to_string(),
                slug: None,
                description: None,
                is_active: None,
            },
        )
        .await
        .unwrap();

        let a = seed_product(&db.pool, "A").await;
        let b = seed_product(&db.pool, "B").await;
        let c = seed_product(&db.pool, "C").await;

        let products =
            CatalogService::set_collection_products(&db.pool, collection.id, &[c.id, a.id, b.id])
                .await
                .unwrap();

        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }
}
