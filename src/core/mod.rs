pub mod careers;
pub mod catalog;
pub mod engine;
pub mod enrollment;
pub mod identity;
pub mod specialization;
pub mod unenrollment;

pub use engine::{PassSettings, SyncEngine, SyncPass};
