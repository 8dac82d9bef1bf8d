pub mod discovery;
pub mod table;
