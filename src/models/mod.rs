pub mod actor;
pub mod directory;
pub mod fee;
pub mod order;
