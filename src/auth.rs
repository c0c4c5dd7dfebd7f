//! Access tokens, authentication events, and the token sources the gate reads from.

pub mod event;
pub mod source;
pub mod token;

pub use event::*;
pub use source::*;
pub use token::*;
