//! Background sweeper that deactivates discounts whose end date has passed.

use std::time::Duration;

use db::{
    DBService,
    models::{activity_log::AdminActivityLog, discount::Discount},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::time::interval;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum DiscountExpiryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Background service that retires expired discount codes.
pub struct DiscountExpiryService {
    db: DBService,
    poll_interval: Duration,
}

impl DiscountExpiryService {
    /// Spawn the background expiry sweeper.
    pub async fn spawn(db: DBService) -> tokio::task::JoinHandle<()> {
        let service = Self {
            db,
            poll_interval: Duration::from_secs(300),
        };
        tokio::spawn(async move {
            service.start().await;
        })
    }

    async fn start(&self) {
        info!(
            "Starting discount expiry service with interval {:?}",
            self.poll_interval
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;
            if let Err(e) = Self::sweep_once(&self.db.pool).await {
                error!("Error sweeping expired discounts: {}", e);
            }
        }
    }

    /// Deactivate every active discount past its end date. Returns how many
    /// rows were retired.
    pub async fn sweep_once(pool: &SqlitePool) -> Result<usize, DiscountExpiryError> {
        let expired = Discount::find_expired(pool).await?;

        if expired.is_empty() {
            debug!("Discount expiry: nothing to retire");
            return Ok(0);
        }

        for discount in &expired {
            Discount::set_active(pool, discount.id, false).await?;

            AdminActivityLog::create(
                pool,
                "discount",
                Some(discount.id),
                "expired",
                Some(format!("code {} deactivated after end date", discount.code)),
            )
            .await?;

            info!(
                discount_id = %discount.id,
                code = %discount.code,
                ends_at = ?discount.ends_at,
                "discount expired, deactivated"
            );
        }

        Ok(expired.len())
    }
}
