mod interface;
mod lock;
mod state;
mod status;
#[cfg(test)]
mod tests;

pub use interface::*;
pub use lock::*;
pub use state::*;
pub use status::*;
