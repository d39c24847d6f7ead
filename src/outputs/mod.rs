//! Output generation for new entries.
//!
//! # Submodules
//!
//! - [`formatter`]: Renders an entry in the full or compact layout
//! - [`sink`]: Single consumer that writes rendered entries to stdout or a file
//!
//! Pollers never touch the output stream themselves. They send finished
//! records over an `mpsc` channel and the sink writes them one at a time, so
//! records from concurrent feeds never interleave.

pub mod formatter;
pub mod sink;
