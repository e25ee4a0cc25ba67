mod ownership;
mod service;

pub use ownership::OwnershipError;
pub use service::ServiceError;
