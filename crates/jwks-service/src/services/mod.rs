pub mod issuance_service;
pub mod key_registry;
