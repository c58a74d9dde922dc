pub mod loader;
pub mod notifier;
