mod envelope;
mod events;
mod protocol;

pub use envelope::*;
pub use events::*;
pub use protocol::*;
