use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use super::FACTURAS;
use crate::{
    error::AppResult,
    models::{invalid_factura, CreateFactura, Factura},
    store::next_id,
    AppState,
};

pub async fn list_facturas(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<Factura>>)> {
    let start = Instant::now();
    let facturas = state.facturas.load().await?;
    let elapsed = start.elapsed();

    info!(count = facturas.len(), "Listed facturas");

    state
        .metrics
        .write()
        .await
        .record("list", FACTURAS, elapsed, facturas.len());

    Ok((StatusCode::OK, Json(facturas)))
}

pub async fn create_factura(
    State(state): State<AppState>,
    payload: Result<Json<CreateFactura>, JsonRejection>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(payload) = payload.map_err(|_| invalid_factura())?;
    let new = payload.validate()?;

    let start = Instant::now();
    let (factura, count) = state
        .facturas
        .mutate(|items| {
            let factura = new.issue(next_id(items)?, Utc::now());
            items.push(factura.clone());
            Ok((factura, items.len()))
        })
        .await?;
    let elapsed = start.elapsed();

    state
        .metrics
        .write()
        .await
        .record("create", FACTURAS, elapsed, count);

    info!(
        id = factura.id,
        cedula = %factura.cedula,
        lineas = factura.productos.len(),
        total = %factura.total,
        "Created factura"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "mensaje": "Factura guardada",
            "factura": factura,
        })),
    ))
}
