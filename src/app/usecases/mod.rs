mod defaults;
pub mod light;

pub use defaults::DefaultsUsecases;
