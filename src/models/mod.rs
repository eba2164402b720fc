//! Modelos del sistema
//!
//! Este módulo contiene los modelos de dominio del motor de planificación:
//! patrones de días, circuits, trajets, arrets, ocurrencias y usagers.

pub mod arret;
pub mod circuit;
pub mod day_entry;
pub mod occurrence;
pub mod tenant;
pub mod trajet;
pub mod usager;

pub use arret::*;
pub use circuit::*;
pub use day_entry::*;
pub use occurrence::*;
pub use tenant::*;
pub use trajet::*;
pub use usager::*;
