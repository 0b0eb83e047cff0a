pub mod loader;
pub mod settings;
