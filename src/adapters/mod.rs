// Adapters layer: concrete implementations for external systems (catalog http, local files).

pub mod http;
pub mod storage;
