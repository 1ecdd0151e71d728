pub mod chat;
pub mod message;

pub use chat::{Chat, ChatRow};
pub use message::{
    Message, MessageId, MessageKind, MessageRow, DELETED_MESSAGE_PLACEHOLDER, TEMP_ID_MARKER,
};
