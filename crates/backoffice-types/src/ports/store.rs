use async_trait::async_trait;

use crate::domain::catalog::{Category, Product};
use crate::domain::customer::Customer;
use crate::domain::order::{Order, OrderDraft};
use crate::domain::registrar::{Course, Enrollment, Student};
use crate::domain::resource::Resource;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("db error: {0}")]
    DbError(String),
}

/// Record-level access for one entity type. Missing rows are `Ok(None)` /
/// `Ok(false)`; errors are reserved for store failures.
#[async_trait]
pub trait ResourceStore<E: Resource>: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<E>, RepoError>;
    async fn get(&self, id: i64) -> Result<Option<E>, RepoError>;
    async fn create(&self, draft: E::Draft) -> Result<E, RepoError>;
    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, RepoError>;
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}

/// The composite operation: an order and its line items persist together or
/// not at all.
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, RepoError>;
    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError>;
    async fn list_orders(&self) -> Result<Vec<Order>, RepoError>;
}

/// Everything the backoffice services need from a storage backend.
pub trait BackofficeStore:
    ResourceStore<Category>
    + ResourceStore<Product>
    + ResourceStore<Customer>
    + ResourceStore<Student>
    + ResourceStore<Course>
    + ResourceStore<Enrollment>
    + OrderStore
{
}

impl<T> BackofficeStore for T where
    T: ResourceStore<Category>
        + ResourceStore<Product>
        + ResourceStore<Customer>
        + ResourceStore<Student>
        + ResourceStore<Course>
        + ResourceStore<Enrollment>
        + OrderStore
{
}
