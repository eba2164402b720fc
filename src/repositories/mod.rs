//! Repositorios
//!
//! Un trait por agregado. `Store` los agrupa para que los servicios reciban un
//! único `Arc<dyn Store>`, ya sea PostgreSQL o el almacén en memoria.

pub mod arret_repository;
pub mod circuit_repository;
pub mod memory_store;
pub mod occurrence_repository;
pub mod pg_store;
pub mod trajet_repository;
pub mod usager_repository;

pub use arret_repository::ArretRepository;
pub use circuit_repository::CircuitRepository;
pub use memory_store::MemoryStore;
pub use occurrence_repository::OccurrenceRepository;
pub use pg_store::PgStore;
pub use trajet_repository::TrajetRepository;
pub use usager_repository::UsagerRepository;

pub trait Store:
    CircuitRepository
    + TrajetRepository
    + ArretRepository
    + OccurrenceRepository
    + UsagerRepository
    + Send
    + Sync
{
}

impl<T> Store for T where
    T: CircuitRepository
        + TrajetRepository
        + ArretRepository
        + OccurrenceRepository
        + UsagerRepository
        + Send
        + Sync
{
}
