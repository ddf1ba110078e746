//! Domain entities for webssh.
//!
//! Pure value types with no infrastructure dependencies.  Code in the outer
//! layers (the session state machine, the terminal adapters, the CLI) depends
//! on these, never the other way round.

/// Host credentials collected from the user at connect time.
pub mod credentials;

/// Terminal surface size in character cells.
pub mod viewport;
