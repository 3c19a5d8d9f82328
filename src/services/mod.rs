//! Service layer: classification, planning, content production, shaping,
//! and the turn controller that wires them together per turn.

pub mod canned;
pub mod classifiers;
pub mod digest;
pub mod dispatcher;
pub mod governor;
pub mod guided_path;
pub mod injection;
pub mod lenses;
pub mod session_store;
pub mod shaping;
pub mod turn_controller;

pub use dispatcher::ContentDispatcher;
pub use session_store::SessionStore;
pub use turn_controller::TurnController;
