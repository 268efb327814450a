pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod ddl;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod types;
