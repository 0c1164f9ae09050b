pub mod channel;
pub mod health;
pub mod message;
pub mod response;
pub mod result;
pub mod retry;
pub mod stats;
pub mod status;
pub mod template;
pub mod validation;
