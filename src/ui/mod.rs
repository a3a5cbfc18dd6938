pub mod console;
pub mod panels;
pub mod plot;
pub mod table;
