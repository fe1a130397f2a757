pub mod file;
pub mod format;
pub mod memory;
pub mod table;
