//! Library half of the `wstl-loc` binary, split out so the command handlers
//! can be tested without spawning a process.

pub mod cli;
pub mod logging;
pub mod vars;
