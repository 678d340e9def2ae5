pub mod services;

pub use services::PlantService;
