pub mod name;
pub mod phone;
pub mod place;
pub mod record;
pub mod registry;

pub use name::*;
pub use phone::*;
pub use place::*;
pub use record::*;
pub use registry::*;
