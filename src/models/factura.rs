use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::{AppError, AppResult};
use crate::store::Record;

/// An invoice. Line items are kept as raw JSON; their shape belongs to the
/// frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factura {
    pub id: i64,
    pub cliente: String,
    pub cedula: String,
    pub productos: Vec<serde_json::Value>,
    pub total: Number,
    #[serde(with = "iso_millis")]
    pub fecha: DateTime<Utc>,
}

impl Record for Factura {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateFactura {
    pub cliente: Option<String>,
    pub cedula: Option<String>,
    pub productos: Option<Vec<serde_json::Value>>,
    pub total: Option<Number>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFactura {
    pub cliente: String,
    pub cedula: String,
    pub productos: Vec<serde_json::Value>,
    pub total: Number,
}

impl CreateFactura {
    pub fn validate(self) -> AppResult<NewFactura> {
        match self {
            CreateFactura {
                cliente: Some(cliente),
                cedula: Some(cedula),
                productos: Some(productos),
                total: Some(total),
            } if !cliente.is_empty() && !cedula.is_empty() && !productos.is_empty() => {
                Ok(NewFactura {
                    cliente,
                    cedula,
                    productos,
                    total,
                })
            }
            _ => Err(invalid_factura()),
        }
    }
}

impl NewFactura {
    pub fn issue(self, id: i64, fecha: DateTime<Utc>) -> Factura {
        Factura {
            id,
            cliente: self.cliente,
            cedula: self.cedula,
            productos: self.productos,
            total: self.total,
            fecha,
        }
    }
}

pub fn invalid_factura() -> AppError {
    AppError::BadRequest("Datos incompletos o inválidos".to_string())
}

/// `fecha` is written as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(fecha: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&fecha.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|fecha| fecha.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload(productos: Vec<serde_json::Value>) -> CreateFactura {
        CreateFactura {
            cliente: Some("Ana Torres".to_string()),
            cedula: Some("0102030405".to_string()),
            productos: Some(productos),
            total: Number::from_f64(12.5),
        }
    }

    #[test]
    fn complete_payload_validates() {
        let new = payload(vec![json!({ "id": 1, "cantidad": 2 })]).validate().unwrap();
        assert_eq!(new.cliente, "Ana Torres");
        assert_eq!(new.productos.len(), 1);
    }

    #[test]
    fn empty_productos_is_rejected() {
        assert!(matches!(
            payload(vec![]).validate(),
            Err(AppError::BadRequest(msg)) if msg == "Datos incompletos o inválidos"
        ));
    }

    #[test]
    fn missing_or_empty_fields_are_rejected() {
        let mut body = payload(vec![json!("x")]);
        body.cedula = Some(String::new());
        assert!(body.validate().is_err());

        let mut body = payload(vec![json!("x")]);
        body.total = None;
        assert!(body.validate().is_err());

        assert!(CreateFactura::default().validate().is_err());
    }

    #[test]
    fn zero_total_is_present() {
        let mut body = payload(vec![json!({})]);
        body.total = Some(Number::from(0));
        assert_eq!(body.validate().unwrap().total, Number::from(0));
    }

    #[test]
    fn whole_number_total_is_kept_as_written() {
        let mut body = payload(vec![json!({})]);
        body.total = Some(Number::from(25));
        let factura = body.validate().unwrap().issue(1, Utc::now());

        assert_eq!(serde_json::to_value(&factura).unwrap()["total"], json!(25));
        assert!(serde_json::to_string(&factura).unwrap().contains(r#""total":25,"#));
    }

    #[test]
    fn fecha_serializes_with_millisecond_precision() {
        let fecha = Utc.with_ymd_and_hms(2025, 3, 1, 14, 5, 9).unwrap()
            + chrono::Duration::milliseconds(123);
        let factura = payload(vec![json!({ "nombre": "Pan" })])
            .validate()
            .unwrap()
            .issue(4, fecha);

        let value = serde_json::to_value(&factura).unwrap();
        assert_eq!(value["fecha"], "2025-03-01T14:05:09.123Z");
        assert_eq!(value["id"], 4);

        let back: Factura = serde_json::from_value(value).unwrap();
        assert_eq!(back.fecha, fecha);
    }
}
