pub mod directory;
pub mod meta;
