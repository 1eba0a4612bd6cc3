pub use abc_core::{
    AppConfig, EngineConfig, EvolutionEvent, MailboxHandle, MetricsSnapshot, ParameterPatch,
    SimulationParameters, World,
};
pub mod config {
    pub use abc_core::config::*;
}
pub mod entity {
    pub use abc_data::*;
}
pub mod events {
    pub use abc_core::events::*;
}
pub mod formation {
    pub use abc_core::formation::*;
}
pub mod mailbox {
    pub use abc_core::mailbox::*;
}
pub mod math {
    pub use abc_core::math::*;
}
pub mod stats {
    pub use abc_core::stats::*;
}
pub mod systems {
    pub use abc_core::systems::*;
}
pub mod world {
    pub use abc_core::world::*;
}
pub mod history {
    pub use abc_io::history::*;
}
pub mod export {
    pub use abc_io::export::*;
}
pub mod observer {
    pub use abc_observer::*;
}
