pub mod events;
pub mod progress;
