#![cfg(feature = "memory")]

use backoffice_repo::memory::InMemoryStore;
use backoffice_types::domain::catalog::{
    Category, CategoryDraft, CategoryPatch, Product, ProductDraft, ProductPatch,
};
use backoffice_types::domain::customer::{Customer, CustomerDraft, CustomerPatch};
use backoffice_types::domain::order::{OrderDraft, OrderItemDraft};
use backoffice_types::ports::store::{OrderStore, RepoError, ResourceStore};

#[tokio::test]
async fn category_crud_flow() {
    let store = InMemoryStore::new();

    let created: Category = store
        .create(CategoryDraft {
            name: "Books".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, 1);

    let fetched: Option<Category> = store.get(created.id).await.unwrap();
    assert_eq!(fetched.unwrap(), created);

    let listed: Vec<Category> = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);

    let renamed: Option<Category> = store
        .update(
            created.id,
            CategoryPatch {
                name: Some("Novels".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.unwrap().name, "Novels");

    assert!(ResourceStore::<Category>::delete(&store, created.id)
        .await
        .unwrap());
    let missing: Option<Category> = store.get(created.id).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn ids_are_sequential_and_listing_keeps_insertion_order() {
    let store = InMemoryStore::new();

    for name in ["Books", "Games", "Tools"] {
        let _: Category = store
            .create(CategoryDraft { name: name.into() })
            .await
            .unwrap();
    }

    let listed: Vec<Category> = store.list().await.unwrap();
    assert_eq!(
        listed.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        listed.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["Books", "Games", "Tools"]
    );
}

#[tokio::test]
async fn empty_patch_is_a_no_op() {
    let store = InMemoryStore::new();
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
async fn duplicate_email_conflicts_on_create_and_update() {
    let store = InMemoryStore::new();
    let first: Customer = store
        .create(CustomerDraft {
            name: "Alice".into(),
            email: "a@b.com".into(),
        })
        .await
        .unwrap();
    let second: Customer = store
        .create(CustomerDraft {
            name: "Bob".into(),
            email: "b@c.com".into(),
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

    // Re-submitting a customer's own email is not a conflict.
    let own: Option<Customer> = store
        .update(
            first.id,
            CustomerPatch {
                email: Some("a@b.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(own.unwrap().email, "a@b.com");
}

#[tokio::test]
async fn missing_rows_are_none_or_false() {
    let store = InMemoryStore::new();

    let missing: Option<Category> = store.get(42).await.unwrap();
    assert!(missing.is_none());

    let updated: Option<Category> = store.update(42, CategoryPatch::default()).await.unwrap();
    assert!(updated.is_none());

    assert!(!ResourceStore::<Category>::delete(&store, 42).await.unwrap());
}

#[tokio::test]
async fn order_keeps_its_items_together() {
    let store = InMemoryStore::new();

    let order = store
        .create_order(OrderDraft {
            customer_id: 7,
            items: vec![
                OrderItemDraft {
                    product_id: 1,
                    quantity: 2,
                },
                OrderItemDraft {
                    product_id: 2,
                    quantity: 5,
                },
            ],
        })
        .await
        .unwrap();
    assert_eq!(order.id, 1);
    assert_eq!(order.items.len(), 2);
    assert!(order.items.iter().all(|item| item.order_id == order.id));

    let fetched = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(fetched, order);

    let listed = store.list_orders().await.unwrap();
    assert_eq!(listed.len(), 1);

    assert!(store.get_order(42).await.unwrap().is_none());
}
