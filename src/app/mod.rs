// Application layer - Session orchestration and wiring

pub mod container;
pub mod session;

pub use container::{AppContainer, DefaultAppContainer};
pub use session::{SessionPhase, SessionSnapshot, SplitSession};
