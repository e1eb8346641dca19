//! In-memory stores.
//!
//! Same contracts as the `PostgreSQL` repositories, held in process memory
//! behind a `tokio::sync::RwLock`. Selected with `ENZI_STORE=memory` and used
//! by the test suites.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use enzi_core::{Email, OrderId, UserId};

use super::{OrderStore, RepositoryError, UserStore};
use crate::models::{NewOrder, NewUser, Order, User};

/// User store kept in a map keyed by id.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<UserId, (User, String)>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let created = User {
            id: UserId::generate(),
            email: user.email,
            name: user.name,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, (created.clone(), user.password_hash));
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).map(|(u, _)| u.clone()))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.find_credentials(email).await?.map(|(user, _)| user))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|(u, _)| &u.email == email)
            .cloned())
    }
}

/// Order store kept in insertion order.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let now = Utc::now();
        let created = Order {
            id: OrderId::generate(),
            user_id: order.user_id,
            total_amount: order.total_amount,
            item_count: order.item_count,
            items: order.items,
            created_at: now,
            updated_at: now,
        };
        self.orders.write().await.push(created.clone());
        Ok(created)
    }

    async fn list_by_owner(
        &self,
        owner: UserId,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        let orders = self.orders.read().await;
        let owned: Vec<&Order> = orders.iter().rev().filter(|o| o.user_id == owner).collect();
        let total = i64::try_from(owned.len()).unwrap_or(i64::MAX);

        let skip = usize::try_from(page.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(usize::try_from(limit).unwrap_or(usize::MAX));
        let take = usize::try_from(limit).unwrap_or(usize::MAX);

        let page = owned.into_iter().skip(skip).take(take).cloned().collect();
        Ok((page, total))
    }

    async fn list_by_owner_in_window(
        &self,
        owner: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .rev()
            .filter(|o| o.user_id == owner && o.created_at >= start && o.created_at <= end)
            .cloned()
            .collect())
    }

    async fn find_by_id_and_owner(
        &self,
        id: OrderId,
        owner: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|o| o.id == id && o.user_id == owner)
            .cloned())
    }
}
