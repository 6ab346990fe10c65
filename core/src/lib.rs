#![no_std]

extern crate alloc;

pub use board::*;
pub use card::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use feedback::*;
pub use generator::*;
pub use guard::*;
pub use provider::*;
pub use scheduler::*;
pub use storage::*;
pub use types::*;

mod board;
mod card;
mod config;
mod engine;
mod error;
mod feedback;
mod generator;
mod guard;
mod provider;
mod scheduler;
mod storage;
mod types;
