pub mod backend;
pub mod connection;
pub mod errors;
pub mod remote;
pub mod service;

pub use remote::ParseRemote;
pub use service::CatalogService;
