// Announcers turn raw notifications into speech requests

pub mod focus;
pub mod key;

pub use focus::{FocusAnnouncer, FocusOutcome};
pub use key::{KeyAnnouncer, KeyNameTable};
