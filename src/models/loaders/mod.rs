pub mod toml_loader;

pub use toml_loader::{load_catalog_from_toml, load_order_plan};
