// Adapters layer: concrete implementations of the domain ports (map surface, backend http).

pub mod http;
pub mod map;
