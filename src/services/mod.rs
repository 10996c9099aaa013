pub mod status_store;
pub mod storage;
pub mod upload_service;
