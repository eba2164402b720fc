pub mod arret_controller;
pub mod association_controller;
pub mod circuit_controller;
pub mod occurrence_controller;
pub mod trajet_controller;
