pub mod button;
pub mod config;
pub mod debounce;
pub mod display_state;
pub mod error;
pub mod events;
pub mod geometry;
pub mod poll_loop;
pub mod processing;
pub mod render;
pub mod shutdown;

pub use error::Error;
