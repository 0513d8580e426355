pub mod client;
pub mod config;
pub mod resources;
pub mod token;

pub use client::{ApiClient, REQUEST_ID_HEADER, extract_detail};
pub use config::ApiConfig;
pub use resources::SEARCH_PARAM;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
