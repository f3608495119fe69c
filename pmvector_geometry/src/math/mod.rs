mod area;
pub use area::*;
