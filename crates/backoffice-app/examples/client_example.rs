///  To run :
///  cargo r --example client_example
use backoffice_client::BackofficeClient;
use backoffice_hex::application::resource_service::AppService;
use backoffice_hex::inbound::http::{HttpServer, HttpServerConfig};
use backoffice_repo::build_repo;
use backoffice_types::domain::catalog::{Category, CategoryDraft, Product, ProductDraft, ProductPatch};
use backoffice_types::domain::customer::{Customer, CustomerDraft};
use backoffice_types::domain::order::{OrderDraft, OrderItemDraft};
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Start server on ephemeral port.
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // Use a temp file-backed SQLite DB so multiple connections see the same data.
    let tmp = tempdir()?;
    let db_path = tmp.path().join("backoffice.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let repo = build_repo(Some(&db_url)).await?;
    let service = AppService::new(repo);
    let server = HttpServer::new(
        service,
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await?;

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // Use client against the running server.
    let client = BackofficeClient::new(&addr)?;

    let category: Category = client
        .create(&CategoryDraft {
            name: "Stationery".into(),
        })
        .await?;
    println!("Created category id={}", category.id);

    let product: Product = client
        .create(&ProductDraft {
            name: "Pen".into(),
            price: 1.5,
            description: Some("blue ink".into()),
            category_id: category.id,
        })
        .await?;
    println!("Created product id={} price={}", product.id, product.price);

    let repriced: Product = client
        .update(
            product.id,
            &ProductPatch {
                price: Some(2.0),
                ..Default::default()
            },
        )
        .await?;
    println!("Updated product price={}", repriced.price);
    assert_eq!(repriced.name, "Pen");

    let customer: Customer = client
        .create(&CustomerDraft {
            name: "Alice".into(),
            email: "alice@example.com".into(),
        })
        .await?;
    println!("Created customer id={}", customer.id);

    let placed = client
        .place_order(&OrderDraft {
            customer_id: customer.id,
            items: vec![OrderItemDraft {
                product_id: product.id,
                quantity: 2,
            }],
        })
        .await?;
    println!("Placed order id={}", placed.order_id);

    let order = client.get_order(placed.order_id).await?;
    println!(
        "Order {} has {} item(s) for customer {}",
        order.id,
        order.items.len(),
        order.customer_id
    );
    assert_eq!(order.items.len(), 1);

    let orders = client.list_orders().await?;
    println!("{} order(s) on file", orders.len());

    // The product is still referenced by an order item, so the store rejects
    // the delete.
    match client.delete::<Product>(product.id).await {
        Ok(()) => println!("Deleted product"),
        Err(err) => println!("Delete rejected while referenced: {err}"),
    }

    handle.abort();
    Ok(())
}
