pub mod challenge;
pub mod config;
pub mod economy;
pub mod hero;
