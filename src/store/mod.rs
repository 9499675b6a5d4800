pub mod directory;
pub mod fees;
pub mod orders;
