#![cfg(feature = "sqlite")]

use std::path::PathBuf;

use backoffice_repo::sqlite::SqliteStore;
use backoffice_types::domain::catalog::{
    Category, CategoryDraft, Product, ProductDraft, ProductPatch,
};
use backoffice_types::domain::customer::{Customer, CustomerDraft, CustomerPatch};
use backoffice_types::domain::order::{OrderDraft, OrderItemDraft};
use backoffice_types::domain::registrar::{Student, StudentDraft};
use backoffice_types::ports::store::{OrderStore, RepoError, ResourceStore};
use chrono::NaiveDate;

fn temp_db_url() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut path = PathBuf::from(dir.path());
    path.push("backoffice-test.db");
    let url = format!("sqlite://{}", path.display());
    (dir, url)
}

async fn seeded_store() -> (tempfile::TempDir, SqliteStore) {
    let (dir, url) = temp_db_url();
    let store = SqliteStore::connect(&url).await.unwrap();
    (dir, store)
}

#[tokio::test]
async fn product_crud_flow_round_trips() {
    let (_dir, store) = seeded_store().await;

    let _: Category = store
        .create(CategoryDraft {
            name: "Stationery".into(),
        })
        .await
        .unwrap();

    let created: Product = store
        .create(ProductDraft {
            name: "Pen".into(),
            price: 1.5,
            description: Some("blue ink".into()),
            category_id: 1,
        })
        .await
        .unwrap();
    assert_eq!(created.id, 1);
    assert!(created.updated_at.is_none());

    let fetched: Option<Product> = store.get(created.id).await.unwrap();
    assert_eq!(fetched.unwrap(), created);

    let patched: Option<Product> = store
        .update(
            created.id,
            ProductPatch {
                price: Some(2.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let patched = patched.unwrap();
    assert_eq!(patched.price, 2.0);
    assert_eq!(patched.name, "Pen");
    assert_eq!(patched.created_at, created.created_at);
    assert!(patched.updated_at.is_some());

    assert!(ResourceStore::<Product>::delete(&store, created.id)
        .await
        .unwrap());
    let missing: Option<Product> = store.get(created.id).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn empty_patch_is_a_no_op() {
    let (_dir, store) = seeded_store().await;

    let _: Category = store
        .create(CategoryDraft {
            name: "Stationery".into(),
        })
        .await
        .unwrap();
    let product: Product = store
        .create(ProductDraft {
            name: "Pen".into(),
            price: 1.5,
            description: None,
            category_id: 1,
        })
        .await
        .unwrap();

    let updated: Option<Product> = store
        .update(product.id, ProductPatch::default())
        .await
        .unwrap();
    assert_eq!(updated.unwrap(), product);
}

#[tokio::test]
async fn duplicate_email_conflicts_and_keeps_existing_row() {
    let (_dir, store) = seeded_store().await;

    let first: Customer = store
        .create(CustomerDraft {
            name: "Alice".into(),
            email: "a@b.com".into(),
        })
        .await
        .unwrap();

    let dup = ResourceStore::<Customer>::create(
        &store,
        CustomerDraft {
            name: "Alice Again".into(),
            email: "a@b.com".into(),
        },
    )
    .await;
    assert!(matches!(dup, Err(RepoError::Conflict(_))));

    let kept: Option<Customer> = store.get(first.id).await.unwrap();
    assert_eq!(kept.unwrap(), first);

    let second: Customer = store
        .create(CustomerDraft {
            name: "Bob".into(),
            email: "b@c.com".into(),
        })
        .await
        .unwrap();
    let clash: Result<Option<Customer>, _> = store
        .update(
            second.id,
            CustomerPatch {
                email: Some("a@b.com".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(clash, Err(RepoError::Conflict(_))));

    // The failed update rolled back; Bob's email is unchanged.
    let bob: Option<Customer> = store.get(second.id).await.unwrap();
    assert_eq!(bob.unwrap().email, "b@c.com");
}

#[tokio::test]
async fn student_date_of_birth_round_trips() {
    let (_dir, store) = seeded_store().await;

    let created: Student = store
        .create(StudentDraft {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            date_of_birth: Some(NaiveDate::from_ymd_opt(2000, 1, 15).unwrap()),
            major: None,
        })
        .await
        .unwrap();

    let fetched: Option<Student> = store.get(created.id).await.unwrap();
    assert_eq!(fetched.unwrap(), created);
}

#[tokio::test]
async fn order_creation_is_atomic() {
    let (_dir, store) = seeded_store().await;

    let _: Customer = store
        .create(CustomerDraft {
            name: "Alice".into(),
            email: "a@b.com".into(),
        })
        .await
        .unwrap();
    let _: Category = store
        .create(CategoryDraft {
            name: "Stationery".into(),
        })
        .await
        .unwrap();
    let _: Product = store
        .create(ProductDraft {
            name: "Pen".into(),
            price: 1.5,
            description: None,
            category_id: 1,
        })
        .await
        .unwrap();

    let order = store
        .create_order(OrderDraft {
            customer_id: 1,
            items: vec![OrderItemDraft {
                product_id: 1,
                quantity: 2,
            }],
        })
        .await
        .unwrap();
    assert_eq!(order.items.len(), 1);

    let fetched = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(fetched, order);

    // A dangling product id aborts the transaction: no order row, no items.
    let failed = store
        .create_order(OrderDraft {
            customer_id: 1,
            items: vec![
                OrderItemDraft {
                    product_id: 1,
                    quantity: 1,
                },
                OrderItemDraft {
                    product_id: 999,
                    quantity: 1,
                },
            ],
        })
        .await;
    assert!(failed.is_err());

    let orders = store.list_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order.id);
}

#[tokio::test]
async fn deleting_referenced_rows_is_rejected() {
    let (_dir, store) = seeded_store().await;

    let _: Category = store
        .create(CategoryDraft {
            name: "Stationery".into(),
        })
        .await
        .unwrap();
    let _: Product = store
        .create(ProductDraft {
            name: "Pen".into(),
            price: 1.5,
            description: None,
            category_id: 1,
        })
        .await
        .unwrap();

    let blocked = ResourceStore::<Category>::delete(&store, 1).await;
    assert!(matches!(blocked, Err(RepoError::DbError(_))));

    // Dropping the product first unblocks the category.
    assert!(ResourceStore::<Product>::delete(&store, 1).await.unwrap());
    assert!(ResourceStore::<Category>::delete(&store, 1).await.unwrap());
}

#[tokio::test]
async fn missing_rows_are_none_or_false() {
    let (_dir, store) = seeded_store().await;

    let missing: Option<Customer> = store.get(42).await.unwrap();
    assert!(missing.is_none());

    let updated: Option<Customer> = store.update(42, CustomerPatch::default()).await.unwrap();
    assert!(updated.is_none());

    assert!(!ResourceStore::<Customer>::delete(&store, 42).await.unwrap());
}
