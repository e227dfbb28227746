pub mod datasource;
pub mod statement;
