pub mod confirmation;
pub mod console;
pub mod flow;
