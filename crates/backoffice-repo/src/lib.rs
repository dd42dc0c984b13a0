#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a repo feature: `memory` or `sqlite`.");

use backoffice_types::domain::catalog::{Category, Product};
use backoffice_types::domain::customer::Customer;
use backoffice_types::domain::order::{Order, OrderDraft};
use backoffice_types::domain::registrar::{Course, Enrollment, Student};
use backoffice_types::domain::resource::Resource;
use backoffice_types::ports::store::{OrderStore, RepoError, ResourceStore};

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Storage backend selected at build time (and, when both features are
/// compiled, by whether a database URL is configured).
pub enum Repo {
    #[cfg(feature = "memory")]
    Memory(memory::InMemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteStore),
}

pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Repo> {
    Repo::build_repo(database_url).await
}

impl Repo {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build_repo(_: Option<&str>) -> anyhow::Result<Self> {
        Ok(Repo::Memory(memory::InMemoryStore::new()))
    }

    #[cfg(all(feature = "sqlite", not(feature = "memory")))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or("sqlite://backoffice.db");
        Ok(Repo::Sqlite(sqlite::SqliteStore::connect(url).await?))
    }

    // If both features are enabled, a configured database wins.
    #[cfg(all(feature = "sqlite", feature = "memory"))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        match database_url {
            Some(url) => Ok(Repo::Sqlite(sqlite::SqliteStore::connect(url).await?)),
            None => Ok(Repo::Memory(memory::InMemoryStore::new())),
        }
    }
}

macro_rules! with_backend {
    ($self:ident, $store:ident => $body:expr) => {
        match $self {
            #[cfg(feature = "memory")]
            Repo::Memory($store) => $body,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite($store) => $body,
        }
    };
}

macro_rules! delegate_resource_store {
    ($entity:ty) => {
        #[async_trait::async_trait]
        impl ResourceStore<$entity> for Repo {
            async fn list(&self) -> Result<Vec<$entity>, RepoError> {
                with_backend!(self, store => ResourceStore::<$entity>::list(store).await)
            }

            async fn get(&self, id: i64) -> Result<Option<$entity>, RepoError> {
                with_backend!(self, store => ResourceStore::<$entity>::get(store, id).await)
            }

            async fn create(
                &self,
                draft: <$entity as Resource>::Draft,
            ) -> Result<$entity, RepoError> {
                with_backend!(self, store => ResourceStore::<$entity>::create(store, draft).await)
            }

            async fn update(
                &self,
                id: i64,
                patch: <$entity as Resource>::Patch,
            ) -> Result<Option<$entity>, RepoError> {
                with_backend!(self, store => ResourceStore::<$entity>::update(store, id, patch).await)
            }

            async fn delete(&self, id: i64) -> Result<bool, RepoError> {
                with_backend!(self, store => ResourceStore::<$entity>::delete(store, id).await)
            }
        }
    };
}

delegate_resource_store!(Category);
delegate_resource_store!(Product);
delegate_resource_store!(Customer);
delegate_resource_store!(Student);
delegate_resource_store!(Course);
delegate_resource_store!(Enrollment);

#[async_trait::async_trait]
impl OrderStore for Repo {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, RepoError> {
        with_backend!(self, store => store.create_order(draft).await)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        with_backend!(self, store => store.get_order(id).await)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        with_backend!(self, store => store.list_orders().await)
    }
}
