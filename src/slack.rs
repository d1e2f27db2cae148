//! Slack Web API client and Socket Mode transport.

mod api;
mod socket;

pub use api::{ConversationInfo, SlackApi, SlackClient, UserInfo};
pub use socket::SocketModeClient;
