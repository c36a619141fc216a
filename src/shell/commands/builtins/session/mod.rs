pub mod help;
pub mod history;
pub mod undo;
