pub mod project;
pub mod role;
pub mod time_entry;
pub mod user;
