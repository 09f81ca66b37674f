pub mod command;
pub mod compress;
