pub mod catalog;
pub mod xml;
