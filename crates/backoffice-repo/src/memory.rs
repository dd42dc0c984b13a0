use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use backoffice_types::domain::catalog::{Category, Product};
use backoffice_types::domain::customer::Customer;
use backoffice_types::domain::order::{Order, OrderDraft, OrderItem};
use backoffice_types::domain::registrar::{Course, Enrollment, Student};
use backoffice_types::domain::resource::Resource;
use backoffice_types::ports::store::{OrderStore, RepoError, ResourceStore};

/// One entity's in-memory rows: a concurrent map plus an id sequence.
pub struct Table<E> {
    rows: DashMap<i64, E>,
    seq: AtomicI64,
}

impl<E: Resource> Table<E> {
    fn new() -> Self {
        Self {
            rows: DashMap::new(),
            seq: AtomicI64::new(0),
        }
    }

    fn next_id(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn conflict() -> RepoError {
        RepoError::Conflict(format!(
            "{} already exists",
            E::UNIQUE_FIELD.unwrap_or("value")
        ))
    }

    fn list(&self) -> Vec<E> {
        let mut rows: Vec<E> = self.rows.iter().map(|kv| kv.value().clone()).collect();
        // DashMap iteration is unordered; id order restores insertion order.
        rows.sort_by_key(|row| row.id());
        rows
    }

    fn get(&self, id: i64) -> Option<E> {
        self.rows.get(&id).map(|row| row.clone())
    }

    fn insert(&self, draft: E::Draft) -> Result<E, RepoError> {
        if let Some(value) = E::draft_unique_value(&draft) {
            if self
                .rows
                .iter()
                .any(|kv| kv.value().unique_value() == Some(value))
            {
                return Err(Self::conflict());
            }
        }
        let id = self.next_id();
        let row = E::hydrate(draft, id, Utc::now());
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, RepoError> {
        if let Some(value) = E::patch_unique_value(&patch) {
            if self
                .rows
                .iter()
                .any(|kv| *kv.key() != id && kv.value().unique_value() == Some(value))
            {
                return Err(Self::conflict());
            }
        }
        match self.rows.get_mut(&id) {
            Some(mut row) => {
                row.apply(patch, Utc::now());
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    fn remove(&self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }
}

/// Process-local store. Lives for the process lifetime; lost on restart.
/// No referential integrity checks beyond the email uniqueness scans.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    categories: Table<Category>,
    products: Table<Product>,
    customers: Table<Customer>,
    students: Table<Student>,
    courses: Table<Course>,
    enrollments: Table<Enrollment>,
    orders: DashMap<i64, Order>,
    order_seq: AtomicI64,
    order_item_seq: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                categories: Table::new(),
                products: Table::new(),
                customers: Table::new(),
                students: Table::new(),
                courses: Table::new(),
                enrollments: Table::new(),
                orders: DashMap::new(),
                order_seq: AtomicI64::new(0),
                order_item_seq: AtomicI64::new(0),
            }),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps an entity type to its table.
pub trait HasTable<E: Resource> {
    #[doc(hidden)]
    fn table(&self) -> &Table<E>;
}

macro_rules! has_table {
    ($entity:ty, $field:ident) => {
        impl HasTable<$entity> for InMemoryStore {
            fn table(&self) -> &Table<$entity> {
                &self.inner.$field
            }
        }
    };
}

has_table!(Category, categories);
has_table!(Product, products);
has_table!(Customer, customers);
has_table!(Student, students);
has_table!(Course, courses);
has_table!(Enrollment, enrollments);

#[async_trait]
impl<E> ResourceStore<E> for InMemoryStore
where
    E: Resource,
    InMemoryStore: HasTable<E>,
{
    async fn list(&self) -> Result<Vec<E>, RepoError> {
        Ok(self.table().list())
    }

    async fn get(&self, id: i64) -> Result<Option<E>, RepoError> {
        Ok(self.table().get(id))
    }

    async fn create(&self, draft: E::Draft) -> Result<E, RepoError> {
        self.table().insert(draft)
    }

    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, RepoError> {
        self.table().update(id, patch)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.table().remove(id))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, RepoError> {
        let now = Utc::now();
        let order_id = self.inner.order_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let items = draft
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: self.inner.order_item_seq.fetch_add(1, Ordering::SeqCst) + 1,
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                created_at: now,
            })
            .collect();
        let order = Order {
            id: order_id,
            customer_id: draft.customer_id,
            created_at: now,
            items,
        };
        // One map entry per order keeps creation all-or-nothing.
        self.inner.orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        Ok(self.inner.orders.get(&id).map(|row| row.clone()))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        let mut orders: Vec<Order> = self
            .inner
            .orders
            .iter()
            .map(|kv| kv.value().clone())
            .collect();
        orders.sort_by_key(|order| order.id);
        Ok(orders)
    }
}
