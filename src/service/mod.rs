pub mod caching;
pub mod chat;
pub mod command;
pub mod news;
pub mod nlp;
pub mod viz;
