mod geometry_kind;
pub use geometry_kind::*;

mod properties;
pub use properties::*;

mod value;
pub use value::*;
