//! One generic handler set covers every routed resource; the per-entity
//! routers are stamped out from it.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::application::resource_service::AppService;
use crate::errors::AppError;
use backoffice_types::domain::catalog::{Category, Product};
use backoffice_types::domain::customer::Customer;
use backoffice_types::domain::order::{Order, OrderDraft};
use backoffice_types::domain::registrar::{Course, Enrollment, Student};
use backoffice_types::domain::resource::Resource;
use backoffice_types::ports::store::{OrderStore, ResourceStore};

async fn list_resources<E, R>(
    State(service): State<Arc<AppService<R>>>,
) -> Result<Json<Vec<E>>, AppError>
where
    E: Resource,
    R: ResourceStore<E>,
{
    Ok(Json(service.list::<E>().await?))
}

async fn create_resource<E, R>(
    State(service): State<Arc<AppService<R>>>,
    Json(draft): Json<E::Draft>,
) -> Result<(StatusCode, Json<E>), AppError>
where
    E: Resource,
    R: ResourceStore<E>,
{
    let created = service.create::<E>(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_resource<E, R>(
    State(service): State<Arc<AppService<R>>>,
    Path(id): Path<i64>,
) -> Result<Json<E>, AppError>
where
    E: Resource,
    R: ResourceStore<E>,
{
    Ok(Json(service.get::<E>(id).await?))
}

async fn update_resource<E, R>(
    State(service): State<Arc<AppService<R>>>,
    Path(id): Path<i64>,
    Json(patch): Json<E::Patch>,
) -> Result<Json<E>, AppError>
where
    E: Resource,
    R: ResourceStore<E>,
{
    Ok(Json(service.update::<E>(id, patch).await?))
}

async fn delete_resource<E, R>(
    State(service): State<Arc<AppService<R>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError>
where
    E: Resource,
    R: ResourceStore<E>,
{
    service.delete::<E>(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The five CRUD routes for one resource, mounted under its segment.
fn resource_routes<E, R>() -> Router<Arc<AppService<R>>>
where
    E: Resource,
    R: ResourceStore<E>,
{
    let collection = format!("/api/v1/{}", E::SEGMENT);
    let item = format!("{collection}/{{id}}");
    let collection_routes = get(list_resources::<E, R>).post(create_resource::<E, R>);
    Router::new()
        // Collections answer with and without the trailing slash.
        .route(&collection, collection_routes.clone())
        .route(&format!("{collection}/"), collection_routes)
        .route(
            &item,
            get(get_resource::<E, R>)
                .put(update_resource::<E, R>)
                .delete(delete_resource::<E, R>),
        )
}

#[derive(Serialize)]
struct OrderCreated {
    order_id: i64,
}

async fn create_order<R>(
    State(service): State<Arc<AppService<R>>>,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<OrderCreated>), AppError>
where
    R: OrderStore,
{
    let order = service.place_order(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderCreated { order_id: order.id }),
    ))
}

async fn get_order<R>(
    State(service): State<Arc<AppService<R>>>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError>
where
    R: OrderStore,
{
    Ok(Json(service.get_order(id).await?))
}

async fn list_orders<R>(
    State(service): State<Arc<AppService<R>>>,
) -> Result<Json<Vec<Order>>, AppError>
where
    R: OrderStore,
{
    Ok(Json(service.list_orders().await?))
}

fn order_routes<R>() -> Router<Arc<AppService<R>>>
where
    R: OrderStore,
{
    let collection = get(list_orders::<R>).post(create_order::<R>);
    Router::new()
        .route("/api/v1/orders", collection.clone())
        .route("/api/v1/orders/", collection)
        .route("/api/v1/orders/{id}", get(get_order::<R>))
}

/// Storefront service surface: catalog, customers and order placement.
pub fn storefront_routes<R>() -> Router<Arc<AppService<R>>>
where
    R: ResourceStore<Category> + ResourceStore<Product> + ResourceStore<Customer> + OrderStore,
{
    Router::new()
        .merge(resource_routes::<Category, R>())
        .merge(resource_routes::<Product, R>())
        .merge(resource_routes::<Customer, R>())
        .merge(order_routes::<R>())
}

/// Registrar service surface: students, courses and enrollments.
pub fn registrar_routes<R>() -> Router<Arc<AppService<R>>>
where
    R: ResourceStore<Student> + ResourceStore<Course> + ResourceStore<Enrollment>,
{
    Router::new()
        .merge(resource_routes::<Student, R>())
        .merge(resource_routes::<Course, R>())
        .merge(resource_routes::<Enrollment, R>())
}
