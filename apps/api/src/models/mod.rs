pub mod evaluation;
pub mod history;
