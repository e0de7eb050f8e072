//! Gizmo expression compiler -- turns validated expressions into source
//! text for firmware targets.
//!
//! The compiler is pure: it reads an [`Expression`](gizmo_core::Expression)
//! and returns a string. Choosing where the text lands in a sketch or
//! module is left to the caller.
//!
//! Supported targets:
//! - Arduino C++ (`&&`, `constrain`, `map`)
//! - MicroPython (`and`, `mp.constrain`, `mp.map`)

pub mod compiler;
pub mod error;
pub mod target;

pub use compiler::{quote, CompileOptions, Compiler};
pub use error::CodegenError;
pub use target::Target;
