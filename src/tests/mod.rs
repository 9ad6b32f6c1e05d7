mod book;
mod config;
mod query;
