mod container_registry;
mod data_location;

pub use container_registry::*;
pub use data_location::*;
