//! Core business logic for regfeed.

pub mod identity;
pub mod region_ref;
pub mod scope;
pub mod services;

pub use identity::RequestAdmin;
pub use region_ref::RegionRef;
pub use scope::RegionScope;
pub use services::*;
