use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqlitePool};
use ts_rs::TS;
use utils::text::{non_blank, slugify};
use uuid::Uuid;

use super::product_variant::ProductVariant;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    #[ts(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

impl std::ops::Deref for ProductWithVariants {
    type Target = Product;
    fn deref(&self) -> &Self::Target {
        &self.product
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProduct {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: Option<i64>,
    pub image_path: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateProduct {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
}

/// Admin list filters, bound straight from query parameters.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub active: Option<bool>,
    pub featured: Option<bool>,
    pub q: Option<String>,
}

const COLUMNS: &str = "id, category_id, name, slug, description, price_cents, stock, image_path, is_active, is_featured, sort_order, created_at, updated_at";

impl Product {
    pub async fn list(pool: &SqlitePool, filter: &ProductFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {COLUMNS} FROM products WHERE 1 = 1"
        ));

        if let Some(category_id) = filter.category_id {
            query.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(active) = filter.active {
            query.push(" AND is_active = ").push_bind(active);
        }
        if let Some(featured) = filter.featured {
            query.push(" AND is_featured = ").push_bind(featured);
        }
        if let Some(q) = non_blank(filter.q.clone()) {
            query.push(" AND name LIKE ").push_bind(format!("%{q}%"));
        }
        query.push(" ORDER BY sort_order ASC, created_at ASC");

        query.build_query_as::<Self>().fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM products WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_with_variants(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<ProductWithVariants>, sqlx::Error> {
        let Some(product) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let variants = ProductVariant::find_by_product_id(pool, id).await?;
        Ok(Some(ProductWithVariants { product, variants }))
    }

    /// Active products of an active category, for the storefront listing.
    pub async fn find_active_by_category_slug(
        pool: &SqlitePool,
        category_slug: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT p.id, p.category_id, p.name, p.slug, p.description, p.price_cents, p.stock,
                    p.image_path, p.is_active, p.is_featured, p.sort_order, p.created_at, p.updated_at
             FROM products p
             JOIN categories c ON p.category_id = c.id
             WHERE c.slug = $1 AND c.is_active = 1 AND p.is_active = 1
             ORDER BY p.sort_order ASC, p.created_at ASC",
        )
        .bind(category_slug)
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateProduct) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let slug = non_blank(data.slug.clone()).unwrap_or_else(|| slugify(&data.name));
        let sort_order = Self::next_sort_order(pool, data.category_id).await?;

        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO products (id, category_id, name, slug, description, price_cents, stock, image_path, is_active, is_featured, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.category_id)
        .bind(&data.name)
        .bind(slug)
        .bind(&data.description)
        .bind(data.price_cents)
        .bind(data.stock.unwrap_or(0))
        .bind(&data.image_path)
        .bind(data.is_active.unwrap_or(true))
        .bind(data.is_featured.unwrap_or(false))
        .bind(sort_order)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProduct,
    ) -> Result<Self, sqlx::Error> {
        let slug = non_blank(data.slug.clone()).unwrap_or_else(|| slugify(&data.name));

        sqlx::query_as::<_, Self>(&format!(
            "UPDATE products
             SET category_id = $2, name = $3, slug = $4, description = $5, price_cents = $6,
                 stock = $7, image_path = $8, is_active = $9, is_featured = $10,
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.category_id)
        .bind(&data.name)
        .bind(slug)
        .bind(&data.description)
        .bind(data.price_cents)
        .bind(data.stock)
        .bind(&data.image_path)
        .bind(data.is_active)
        .bind(data.is_featured)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Rewrite `sort_order` so each row's index equals its position in the
    /// submitted array. Runs in a single transaction.
    pub async fn reorder(pool: &SqlitePool, ordered_ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let mut affected = 0;
        let mut tx = pool.begin().await?;
        for (position, id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE products SET sort_order = $2, updated_at = datetime('now', 'subsec') WHERE id = $1",
            )
            .bind(id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
            affected += result.rows_affected();
        }
        tx.commit().await?;
        Ok(affected)
    }

    async fn next_sort_order(
        pool: &SqlitePool,
        category_id: Option<Uuid>,
    ) -> Result<i64, sqlx::Error> {
        match category_id {
            Some(category_id) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM products WHERE category_id = $1",
                )
                .bind(category_id)
                .fetch_one(pool)
                .await
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(sort_order) + 1, 0) FROM products")
                    .fetch_one(pool)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;
    use crate::models::category::{Category, CreateCategory};

    pub(crate) fn create_input(name: &str, price_cents: i64) -> CreateProduct {
        CreateProduct {
            category_id: None,
            name: name.to_string(),
            slug: None,
            description: None,
            price_cents,
            stock: None,
            image_path: None,
            is_active: None,
            is_featured: None,
        }
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = DBService::new_in_memory().await.unwrap();

        let mut input = create_input("Olive Oil", 1250);
        input.is_featured = Some(true);
        Product::create(&db.pool, &input).await.unwrap();

        let mut input = create_input("Sea Salt", 450);
        input.is_active = Some(false);
        Product::create(&db.pool, &input).await.unwrap();

        let all = Product::list(&db.pool, &ProductFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = Product::list(
            &db.pool,
            &ProductFilter {
                active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Olive Oil");

        let searched = Product::list(
            &db.pool,
            &ProductFilter {
                q: Some("salt".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].name, "Sea Salt");
    }

    #[tokio::test]
    async fn test_category_delete_leaves_products_uncategorized() {
        let db = DBService::new_in_memory().await.unwrap();

        let category = Category::create(
            &db.pool,
            &CreateCategory {
                name: "Pantry".to_string(),
                slug: None,
                description: None,
                image_path: None,
                is_active: None,
            },
        )
        .await
        .unwrap();

        let mut input = create_input("Flour", 300);
        input.category_id = Some(category.id);
        let product = Product::create(&db.pool, &input).await.unwrap();

        Category::delete(&db.pool, category.id).await.unwrap();

        let reloaded = Product::find_by_id(&db.pool, product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.category_id, None);
    }

    #[tokio::test]
    async fn test_storefront_listing_by_category_slug() {
        let db = DBService::new_in_memory().await.unwrap();

        let category = Category::create(
            &db.pool,
            &CreateCategory {
                name: "Drinks".to_string(),
                slug: None,
                description: None,
                image_path: None,
                is_active: None,
            },
        )
        .await
        .unwrap();

        let mut input = create_input("Sparkling Water", 150);
        input.category_id = Some(category.id);
        Product::create(&db.pool, &input).await.unwrap();

        let mut input = create_input("Hidden Drink", 150);
        input.category_id = Some(category.id);
        input.is_active = Some(false);
        Product::create(&db.pool, &input).await.unwrap();

        let listed = Product::find_active_by_category_slug(&db.pool, "drinks").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Sparkling Water");
    }
}
