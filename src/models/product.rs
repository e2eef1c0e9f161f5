use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::{AppError, AppResult};
use crate::store::Record;

/// Inventory item as stored in the inventory collection file. `precio` keeps
/// the number exactly as it was sent, so `2` stays `2` and is not rewritten as
/// `2.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub nombre: String,
    pub categoria: String,
    pub cantidad: i64,
    pub precio: Number,
}

impl Record for Product {
    fn id(&self) -> i64 {
        self.id
    }
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// Body of `POST /api/inventory`. Every field is optional at the wire level so
/// that a missing field yields "Datos incompletos" instead of a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateProduct {
    pub nombre: Option<String>,
    pub categoria: Option<String>,
    pub cantidad: Option<i64>,
    pub precio: Option<Number>,
}

/// A create payload that passed the presence checks, waiting for its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub nombre: String,
    pub categoria: String,
    pub cantidad: i64,
    pub precio: Number,
}

impl CreateProduct {
    /// Text fields must be non-empty; numeric fields only need to be present,
    /// so `0` is a valid quantity or price.
    pub fn validate(self) -> AppResult<NewProduct> {
        match self {
            CreateProduct {
                nombre: Some(nombre),
                categoria: Some(categoria),
                cantidad: Some(cantidad),
                precio: Some(precio),
            } if !nombre.is_empty() && !categoria.is_empty() => Ok(NewProduct {
                nombre,
                categoria,
                cantidad,
                precio,
            }),
            _ => Err(incomplete()),
        }
    }
}

impl NewProduct {
    pub fn with_id(self, id: i64) -> Product {
        Product {
            id,
            nombre: self.nombre,
            categoria: self.categoria,
            cantidad: self.cantidad,
            precio: self.precio,
        }
    }
}

/// Body of `PUT /api/inventory/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCantidad {
    pub cantidad: Option<i64>,
}

impl UpdateCantidad {
    pub fn validate(&self) -> AppResult<i64> {
        match self.cantidad {
            Some(cantidad) if cantidad >= 0 => Ok(cantidad),
            _ => Err(invalid_cantidad()),
        }
    }
}

pub fn incomplete() -> AppError {
    AppError::BadRequest("Datos incompletos".to_string())
}

pub fn invalid_cantidad() -> AppError {
    AppError::BadRequest("Cantidad inválida".to_string())
}

pub fn not_found() -> AppError {
    AppError::NotFound("Producto no encontrado".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Number {
        Number::from_f64(v).unwrap()
    }

    fn payload(nombre: &str, categoria: &str, cantidad: Option<i64>, precio: Option<Number>) -> CreateProduct {
        CreateProduct {
            nombre: Some(nombre.to_string()),
            categoria: Some(categoria.to_string()),
            cantidad,
            precio,
        }
    }

    #[test]
    fn complete_payload_validates() {
        let new = payload("Pan", "Alimentos", Some(10), Some(num(1.5))).validate().unwrap();
        assert_eq!(
            new.with_id(1),
            Product {
                id: 1,
                nombre: "Pan".to_string(),
                categoria: "Alimentos".to_string(),
                cantidad: 10,
                precio: num(1.5),
            }
        );
    }

    #[test]
    fn zero_quantity_and_price_are_present() {
        let new = payload("Agua", "Bebidas", Some(0), Some(Number::from(0))).validate().unwrap();
        assert_eq!(new.cantidad, 0);
        assert_eq!(new.precio, Number::from(0));
    }

    #[test]
    fn missing_numeric_field_is_incomplete() {
        assert!(matches!(
            payload("Pan", "Alimentos", None, Some(num(1.5))).validate(),
            Err(AppError::BadRequest(msg)) if msg == "Datos incompletos"
        ));
        assert!(payload("Pan", "Alimentos", Some(3), None).validate().is_err());
    }

    #[test]
    fn empty_text_field_is_incomplete() {
        assert!(payload("", "Alimentos", Some(1), Some(num(1.0))).validate().is_err());
        assert!(payload("Pan", "", Some(1), Some(num(1.0))).validate().is_err());
        assert!(CreateProduct::default().validate().is_err());
    }

    #[test]
    fn null_fields_deserialize_as_missing() {
        let body: CreateProduct = serde_json::from_str(
            r#"{"nombre":"Pan","categoria":"Alimentos","cantidad":null,"precio":2}"#,
        )
        .unwrap();
        assert!(body.cantidad.is_none());
        assert!(body.validate().is_err());
    }

    #[test]
    fn whole_number_precio_is_kept_as_written() {
        let body: CreateProduct = serde_json::from_str(
            r#"{"nombre":"Pan","categoria":"Alimentos","cantidad":4,"precio":2}"#,
        )
        .unwrap();
        let product = body.validate().unwrap().with_id(1);

        let raw = serde_json::to_string(&product).unwrap();
        assert!(raw.contains(r#""precio":2}"#), "{raw}");

        let body: CreateProduct = serde_json::from_str(
            r#"{"nombre":"Pan","categoria":"Alimentos","cantidad":4,"precio":2.0}"#,
        )
        .unwrap();
        let raw = serde_json::to_string(&body.validate().unwrap().with_id(1)).unwrap();
        assert!(raw.contains(r#""precio":2.0}"#), "{raw}");
    }

    #[test]
    fn cantidad_update_bounds() {
        assert_eq!(UpdateCantidad { cantidad: Some(0) }.validate().unwrap(), 0);
        assert_eq!(UpdateCantidad { cantidad: Some(7) }.validate().unwrap(), 7);
        assert!(matches!(
            UpdateCantidad { cantidad: Some(-1) }.validate(),
            Err(AppError::BadRequest(msg)) if msg == "Cantidad inválida"
        ));
        assert!(UpdateCantidad { cantidad: None }.validate().is_err());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let product = Product {
            id: 3,
            nombre: "Arroz".to_string(),
            categoria: "Granos".to_string(),
            cantidad: 12,
            precio: num(0.85),
        };
        assert_eq!(
            serde_json::to_value(&product).unwrap(),
            serde_json::json!({
                "id": 3,
                "nombre": "Arroz",
                "categoria": "Granos",
                "cantidad": 12,
                "precio": 0.85,
            })
        );
    }
}
