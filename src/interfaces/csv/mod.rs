pub mod balance_writer;
pub mod expense_reader;
