use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use backoffice_types::domain::order::{Order, OrderDraft};
use backoffice_types::domain::resource::Resource;

#[derive(Clone)]
pub struct BackofficeClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

/// Typed client for the backoffice API. The per-resource calls are generic:
/// the entity type picks the URL segment and the wire shapes.
#[derive(Clone)]
pub struct BackofficeClient {
    base: Url,
    client: reqwest::Client,
}

impl BackofficeClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<BackofficeClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(BackofficeClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    fn collection_url<E: Resource>(&self) -> anyhow::Result<Url> {
        self.url(&format!("api/v1/{}/", E::SEGMENT))
    }

    fn item_url<E: Resource>(&self, id: i64) -> anyhow::Result<Url> {
        self.url(&format!("api/v1/{}/{}", E::SEGMENT, id))
    }

    pub async fn list<E>(&self) -> anyhow::Result<Vec<E>>
    where
        E: Resource + DeserializeOwned,
    {
        let res = self
            .client
            .get(self.collection_url::<E>()?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn get<E>(&self, id: i64) -> anyhow::Result<E>
    where
        E: Resource + DeserializeOwned,
    {
        let res = self
            .client
            .get(self.item_url::<E>(id)?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn create<E>(&self, draft: &E::Draft) -> anyhow::Result<E>
    where
        E: Resource + DeserializeOwned,
    {
        let res = self
            .client
            .post(self.collection_url::<E>()?)
            .json(draft)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn update<E>(&self, id: i64, patch: &E::Patch) -> anyhow::Result<E>
    where
        E: Resource + DeserializeOwned,
    {
        let res = self
            .client
            .put(self.item_url::<E>(id)?)
            .json(patch)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn delete<E>(&self, id: i64) -> anyhow::Result<()>
    where
        E: Resource,
    {
        self.client
            .delete(self.item_url::<E>(id)?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn place_order(&self, draft: &OrderDraft) -> anyhow::Result<OrderCreated> {
        let res = self
            .client
            .post(self.url("api/v1/orders/")?)
            .json(draft)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn get_order(&self, id: i64) -> anyhow::Result<Order> {
        let res = self
            .client
            .get(self.url(&format!("api/v1/orders/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn list_orders(&self) -> anyhow::Result<Vec<Order>> {
        let res = self
            .client
            .get(self.url("api/v1/orders/")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }
}

impl BackofficeClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<BackofficeClient> {
        if let Some(client) = self.client {
            return Ok(BackofficeClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(BackofficeClient {
            base: self.base,
            client,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderCreated {
    pub order_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_types::domain::catalog::{Product, ProductDraft, ProductPatch};
    use backoffice_types::domain::customer::Customer;
    use backoffice_types::domain::order::OrderItemDraft;
    use httpmock::prelude::*;

    fn sample_product() -> Product {
        Product {
            id: 1,
            name: "Pen".into(),
            price: 1.5,
            description: Some("blue ink".into()),
            category_id: 1,
            created_at: chrono::Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn create_and_get_product() {
        let server = MockServer::start();
        let product = sample_product();
        let draft = ProductDraft {
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            category_id: product.category_id,
        };

        let create_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/products/")
                .json_body_obj(&draft);
            then.status(201).json_body_obj(&product);
        });

        let get_mock = server.mock(|when, then| {
            when.method(GET).path("/api/v1/products/1");
            then.status(200).json_body_obj(&product);
        });

        let client = BackofficeClient::new(&server.base_url()).unwrap();
        let created: Product = client.create(&draft).await.unwrap();
        assert_eq!(created.id, product.id);
        assert_eq!(created.price, 1.5);

        let fetched: Product = client.get(product.id).await.unwrap();
        assert_eq!(fetched.name, "Pen");

        create_mock.assert();
        get_mock.assert();
    }

    #[tokio::test]
    async fn list_update_delete_product() {
        let server = MockServer::start();
        let product = sample_product();

        let list_mock = server.mock(|when, then| {
            when.method(GET).path("/api/v1/products/");
            then.status(200).json_body_obj(&vec![product.clone()]);
        });

        let patch = ProductPatch {
            price: Some(2.0),
            ..Default::default()
        };
        let mut patched = product.clone();
        patched.price = 2.0;
        let update_mock = server.mock(|when, then| {
            when.method(httpmock::Method::PUT)
                .path("/api/v1/products/1")
                .json_body_obj(&patch);
            then.status(200).json_body_obj(&patched);
        });

        let delete_mock = server.mock(|when, then| {
            when.method(DELETE).path("/api/v1/products/1");
            then.status(204);
        });

        let client = BackofficeClient::new(&server.base_url()).unwrap();
        let listed: Vec<Product> = client.list().await.unwrap();
        assert_eq!(listed.len(), 1);

        let updated: Product = client.update(1, &patch).await.unwrap();
        assert_eq!(updated.price, 2.0);

        client.delete::<Product>(1).await.unwrap();

        list_mock.assert();
        update_mock.assert();
        delete_mock.assert();
    }

    #[tokio::test]
    async fn place_order_returns_order_id() {
        let server = MockServer::start();
        let draft = OrderDraft {
            customer_id: 1,
            items: vec![OrderItemDraft {
                product_id: 1,
                quantity: 2,
            }],
        };

        let order_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/orders/")
                .json_body_obj(&draft);
            then.status(201)
                .json_body_obj(&OrderCreated { order_id: 1 });
        });

        let client = BackofficeClient::new(&server.base_url()).unwrap();
        let created = client.place_order(&draft).await.unwrap();
        assert_eq!(created, OrderCreated { order_id: 1 });

        order_mock.assert();
    }

    #[tokio::test]
    async fn not_found_surfaces_as_error() {
        let server = MockServer::start();
        let miss_mock = server.mock(|when, then| {
            when.method(GET).path("/api/v1/customers/42");
            then.status(404)
                .json_body_obj(&serde_json::json!({"error": "Customer not found"}));
        });

        let client = BackofficeClient::new(&server.base_url()).unwrap();
        let res = client.get::<Customer>(42).await;
        assert!(res.is_err());

        miss_mock.assert();
    }

    #[tokio::test]
    async fn builder_applies_headers_and_timeout() {
        let server = MockServer::start();
        let list_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/orders/")
                .header("x-api-key", "secret");
            then.status(200).json_body_obj(&Vec::<Order>::new());
        });

        let client = BackofficeClient::builder(&server.base_url())
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .with_header("x-api-key", "secret")
            .unwrap()
            .build()
            .unwrap();
        let orders = client.list_orders().await.unwrap();
        assert!(orders.is_empty());

        list_mock.assert();
    }
}
