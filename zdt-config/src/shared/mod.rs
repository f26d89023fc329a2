mod base;
mod probe;
mod target;
mod zero_downtime;

pub use base::*;
pub use probe::*;
pub use target::*;
pub use zero_downtime::*;
