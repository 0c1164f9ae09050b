pub mod adapter;
pub mod config_store;
pub mod health;
pub mod history;
pub mod queue;
pub mod telegram;
pub mod template;
pub mod whatsapp;
