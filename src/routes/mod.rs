pub mod default_route;
pub mod lookup_route;
