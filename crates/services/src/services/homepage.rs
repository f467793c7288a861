//! Homepage layout: section visibility, ordering, collection attachment, and
//! the assembled storefront payload.

use db::models::{
    collection::{Collection, CollectionWithProducts},
    hero_slide::HeroSlide,
    homepage_component::HomepageComponent,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum HomepageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("homepage component not found")]
    ComponentNotFound,
    #[error("collection not found")]
    CollectionNotFound,
}

/// One homepage section plus the collection attached to its slot, if any.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct HomeSection {
    #[serde(flatten)]
    #[ts(flatten)]
    pub component: HomepageComponent,
    pub collection: Option<CollectionWithProducts>,
}

/// Everything the storefront home page renders, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct HomePayload {
    pub hero_slides: Vec<HeroSlide>,
    pub sections: Vec<HomeSection>,
}

pub struct HomepageService;

impl HomepageService {
    pub async fn set_visibility(
        pool: &SqlitePool,
        component_id: Uuid,
        is_visible: bool,
    ) -> Result<HomepageComponent, HomepageError> {
        HomepageComponent::find_by_id(pool, component_id)
            .await?
            .ok_or(HomepageError::ComponentNotFound)?;

        let component = HomepageComponent::set_visibility(pool, component_id, is_visible).await?;
        info!(
            component_key = %component.component_key,
            is_visible = is_visible,
            "homepage section visibility updated"
        );
        Ok(component)
    }

    /// Attach a collection to a section slot, or detach with `None`.
    /// Attaching validates that the collection exists.
    pub async fn attach_collection(
        pool: &SqlitePool,
        component_id: Uuid,
        collection_id: Option<Uuid>,
    ) -> Result<HomepageComponent, HomepageError> {
        HomepageComponent::find_by_id(pool, component_id)
            .await?
            .ok_or(HomepageError::ComponentNotFound)?;

        if let Some(collection_id) = collection_id {
            Collection::find_by_id(pool, collection_id)
                .await?
                .ok_or(HomepageError::CollectionNotFound)?;
        }

        let component = HomepageComponent::set_collection(pool, component_id, collection_id).await?;
        info!(
            component_key = %component.component_key,
            collection_id = ?collection_id,
            "homepage section collection updated"
        );
        Ok(component)
    }

    pub async fn reorder(pool: &SqlitePool, ordered_ids: &[Uuid]) -> Result<u64, HomepageError> {
        let affected = HomepageComponent::reorder(pool, ordered_ids).await?;
        if affected != ordered_ids.len() as u64 {
            warn!(
                submitted = ordered_ids.len(),
                affected = affected,
                "homepage reorder named unknown component ids"
            );
        }
        Ok(affected)
    }

    /// Assemble the storefront home page: active hero slides plus visible
    /// sections in display order, each carrying its attached collection and
    /// that collection's products in position order. Inactive or dangling
    /// collections render as empty slots.
    pub async fn home_payload(pool: &SqlitePool) -> Result<HomePayload, HomepageError> {
        let hero_slides = HeroSlide::find_active(pool).await?;

        let mut sections = Vec::new();
        for component in HomepageComponent::find_visible(pool).await? {
            let collection = match component.collection_id {
                Some(collection_id) => match Collection::find_by_id(pool, collection_id).await? {
                    Some(collection) if collection.is_active => {
                        Some(Collection::with_products(pool, collection).await?)
                    }
                    _ => None,
                },
                None => None,
            };
            sections.push(HomeSection {
                component,
                collection,
            });
        }

        Ok(HomePayload {
            hero_slides,
            sections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::DBService;
    use db::models::collection::CreateCollection;
    use db::models::product::{CreateProduct, Product};

    use crate::services::catalog::CatalogService;

    async fn seed_defaults(pool: &SqlitePool) -> Vec<HomepageComponent> {
        HomepageComponent::ensure_defaults(pool).await.unwrap();
        HomepageComponent::find_all(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_attach_collection_validates_target() {
        let db = DBService::new_in_memory().await.unwrap();
        let components = seed_defaults(&db.pool).await;

        let missing = HomepageService::attach_collection(
            &db.pool,
            components[0].id,
            Some(Uuid::new_v4()),
        )
        .await;
        assert!(matches!(missing, Err(HomepageError::CollectionNotFound)));

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

        let attached = HomepageService::attach_collection(
            &db.pool,
            components[0].id,
            Some(collection.id),
        )
        .await
        .unwrap();
        assert_eq!(attached.collection_id, Some(collection.id));

        let detached = HomepageService::attach_collection(&db.pool, components[0].id, None)
            .await
            .unwrap();
        assert_eq!(detached.collection_id, None);
    }

    #[tokio::test]
    async fn test_home_payload_respects_order_and_visibility() {
        let db = DBService::new_in_memory().await.unwrap();
        let components = seed_defaults(&db.pool).await;

        let hidden = HomepageService::set_visibility(&db.pool, components[1].id, false)
            .await
            .unwrap();

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

        let product = Product::create(
            &db.pool,
            &CreateProduct {
                category_id: None,
                name: "Lemonade".to_string(),
                slug: None,
                description: None,
                price_cents: 350,
                stock: None,
                image_path: None,
                is_active: None,
                is_featured: None,
            },
        )
        .await
        .unwrap();

        CatalogService::set_collection_products(&db.pool, collection.id, &[product.id])
            .await
            .unwrap();
        HomepageService::attach_collection(&db.pool, components[0].id, Some(collection.id))
            .await
            .unwrap();

        let payload = HomepageService::home_payload(&db.pool).await.unwrap();

        assert!(payload.hero_slides.is_empty());
        assert_eq!(
            payload.sections.len(),
            components.len() - 1,
            "hidden section must be skipped"
        );
        assert!(
            payload
                .sections
                .iter()
                .all(|s| s.component.component_key != hidden.component_key)
        );

        let first = &payload.sections[0];
        let attached = first.collection.as_ref().unwrap();
        assert_eq!(attached.products.len(), 1);
        assert_eq!(attached.products[0].name, "Lemonade");
    }
}
