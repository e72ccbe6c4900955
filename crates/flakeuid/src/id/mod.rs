mod interface;
mod layout;
mod uid;

pub use interface::*;
pub use layout::*;
pub use uid::*;
