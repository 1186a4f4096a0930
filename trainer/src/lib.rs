pub mod entry;
pub mod loader;

pub use entry::{PositionEntry, Wdl, ENTRY_SIZE};
pub use loader::TrainingDataLoader;
