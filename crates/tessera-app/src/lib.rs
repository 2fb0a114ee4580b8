//! Headless Tessera driver: a generator session walked by a fixed-timestep loop.

pub mod game_loop;
pub mod session;
pub mod walk;

pub use session::{AppError, Session, SessionStats};
