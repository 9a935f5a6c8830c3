mod chat;

pub use chat::ChatService;
