pub mod plant;
pub mod user;

pub use plant::Plant;
pub use user::{Auth, PlantChange, User};
