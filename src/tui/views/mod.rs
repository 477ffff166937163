//! TUI view components
//!
//! Each component renders one part of the screen from borrowed state.

mod confirmation;
mod footer;
mod header;
mod help;
pub mod helpers;
mod workload_list;

pub use confirmation::*;
pub use footer::*;
pub use header::*;
pub use help::*;
pub use workload_list::*;
