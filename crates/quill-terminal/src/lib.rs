pub mod emulator;
pub mod events;
pub mod grid;
pub mod handle;
pub mod registry;
pub mod shell;
pub mod size;

pub use emulator::Emulator;
pub use events::{PtyEvent, PtyEventBus};
pub use grid::{Cell, Grid};
pub use handle::PtyHandle;
pub use registry::{CreateOptions, PtyRegistry};
pub use size::CellMetrics;
