pub mod config_io;
pub mod recovery;
pub mod slot;
