pub mod config;
pub mod providers;
pub mod signing;
pub mod store;
pub mod subtitle;
pub mod terminal;
