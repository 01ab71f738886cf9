pub mod bindings;
pub mod error;
pub mod interpreter;
pub mod strings;
pub mod trace;
pub mod value;

pub use interpreter::Evaluator;
