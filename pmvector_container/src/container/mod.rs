mod pmtiles;
pub use pmtiles::*;
