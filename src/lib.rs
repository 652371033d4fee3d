pub mod config;
pub mod emitter;
pub mod error;
pub mod interpreter;
pub mod labels;
pub mod program;

pub use config::{Config, EofPolicy, PointerPolicy};
pub use emitter::{Assembly, Emitter};
pub use error::Error;
pub use interpreter::{Interpreter, Outcome, interpret};
pub use program::Program;
