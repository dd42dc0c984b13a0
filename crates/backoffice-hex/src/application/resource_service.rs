use crate::errors::AppError;
use backoffice_types::domain::order::{Order, OrderDraft};
use backoffice_types::domain::resource::Resource;
use backoffice_types::ports::store::{OrderStore, ResourceStore};

/// CRUD use-cases, written once and instantiated per entity type. The store
/// reports missing rows as `None`/`false`; this layer turns them into
/// `NotFound` and runs domain validation before anything reaches the store.
pub struct AppService<R> {
    store: R,
}

impl<R> AppService<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    fn not_found<E: Resource>() -> AppError {
        AppError::NotFound(format!("{} not found", E::NAME))
    }

    pub async fn list<E>(&self) -> Result<Vec<E>, AppError>
    where
        E: Resource,
        R: ResourceStore<E>,
    {
        Ok(self.store.list().await?)
    }

    pub async fn get<E>(&self, id: i64) -> Result<E, AppError>
    where
        E: Resource,
        R: ResourceStore<E>,
    {
        match self.store.get(id).await? {
            Some(row) => Ok(row),
            None => Err(Self::not_found::<E>()),
        }
    }

    pub async fn create<E>(&self, draft: E::Draft) -> Result<E, AppError>
    where
        E: Resource,
        R: ResourceStore<E>,
    {
        E::validate_draft(&draft).map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(self.store.create(draft).await?)
    }

    pub async fn update<E>(&self, id: i64, patch: E::Patch) -> Result<E, AppError>
    where
        E: Resource,
        R: ResourceStore<E>,
    {
        E::validate_patch(&patch).map_err(|e| AppError::BadRequest(e.to_string()))?;
        match self.store.update(id, patch).await? {
            Some(row) => Ok(row),
            None => Err(Self::not_found::<E>()),
        }
    }

    pub async fn delete<E>(&self, id: i64) -> Result<(), AppError>
    where
        E: Resource,
        R: ResourceStore<E>,
    {
        let deleted = ResourceStore::<E>::delete(&self.store, id).await?;
        if deleted {
            Ok(())
        } else {
            Err(Self::not_found::<E>())
        }
    }

    pub async fn place_order(&self, draft: OrderDraft) -> Result<Order, AppError>
    where
        R: OrderStore,
    {
        draft
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        // Inside the composite unit every store failure surfaces as a 500,
        // constraint violations included.
        self.store
            .create_order(draft)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    pub async fn get_order(&self, id: i64) -> Result<Order, AppError>
    where
        R: OrderStore,
    {
        match self.store.get_order(id).await? {
            Some(order) => Ok(order),
            None => Err(AppError::NotFound("Order not found".into())),
        }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError>
    where
        R: OrderStore,
    {
        Ok(self.store.list_orders().await?)
    }
}
