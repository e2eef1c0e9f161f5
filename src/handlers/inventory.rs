use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::INVENTORY;
use crate::{
    error::AppResult,
    models::{incomplete, not_found, CreateProduct, Product, UpdateCantidad},
    store::next_id,
    AppState,
};

/// Path ids that are not integers can never match a product.
fn parse_id(raw: &str) -> AppResult<i64> {
    raw.trim().parse().map_err(|_| not_found())
}

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_inventory(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<Product>>)> {
    let start = Instant::now();
    let products = state.inventory.load().await?;
    let elapsed = start.elapsed();

    info!(
        count = products.len(),
        elapsed_ms = elapsed.as_millis(),
        "Listed inventory"
    );

    state
        .metrics
        .write()
        .await
        .record("list", INVENTORY, elapsed, products.len());

    Ok((StatusCode::OK, Json(products)))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProduct>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let Json(payload) = payload.map_err(|_| incomplete())?;
    let new = payload.validate()?;

    let start = Instant::now();
    let (product, count) = state
        .inventory
        .mutate(|items| {
            let product = new.with_id(next_id(items)?);
            items.push(product.clone());
            Ok((product, items.len()))
        })
        .await?;
    let elapsed = start.elapsed();

    state
        .metrics
        .write()
        .await
        .record("create", INVENTORY, elapsed, count);

    info!(id = product.id, nombre = %product.nombre, "Created product");

    Ok((StatusCode::CREATED, Json(product)))
}

// ── Update quantity ───────────────────────────────────────────────────────────

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCantidad>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let id = parse_id(&id)?;
    // An unreadable body is reported as an invalid quantity, after the lookup.
    let update = payload.map(|Json(p)| p).unwrap_or_default();

    let start = Instant::now();
    let (product, count) = state
        .inventory
        .mutate(|items| {
            let count = items.len();
            let product = items
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(not_found)?;
            product.cantidad = update.validate()?;
            Ok((product.clone(), count))
        })
        .await?;
    let elapsed = start.elapsed();

    state
        .metrics
        .write()
        .await
        .record("update", INVENTORY, elapsed, count);

    info!(id, cantidad = product.cantidad, "Updated product quantity");

    Ok((StatusCode::OK, Json(product)))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let id = parse_id(&id)?;

    let start = Instant::now();
    let remaining = state
        .inventory
        .mutate(|items| {
            let index = items
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(not_found)?;
            items.remove(index);
            Ok(items.len())
        })
        .await?;
    let elapsed = start.elapsed();

    state
        .metrics
        .write()
        .await
        .record("delete", INVENTORY, elapsed, remaining);

    info!(id, remaining, "Deleted product");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "mensaje": "Producto eliminado" })),
    ))
}
