//! Domain services used by the websocket gateway and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! `history` and `session` are plain data structures with no I/O. `fanout`
//! is the outbound delivery set. `sync` ties them together under the canvas
//! lock and is the only module route handlers call into.

pub mod fanout;
pub mod history;
pub mod session;
pub mod sync;
