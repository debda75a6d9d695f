// Application layer - Use cases over the speed model and settings
pub mod settings_store;
pub mod speedometer_service;
pub mod streaming_service;
