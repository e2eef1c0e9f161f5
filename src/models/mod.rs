pub mod factura;
pub mod product;

pub use factura::*;
pub use product::*;
