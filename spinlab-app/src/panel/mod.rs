pub mod data;
pub mod kind;
pub mod list;
pub mod position;
pub mod registry;
pub mod view;
