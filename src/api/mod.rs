pub mod export;
pub mod reference;
pub mod stats;
pub mod time_entry;
pub mod user;
