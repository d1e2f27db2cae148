//! In-memory record store for greeted users, the default channel and the bot identity.
//!
//! Nothing here is persisted. The store is owned by the bot's composition root and lent
//! to each handler invocation, so there is exactly one writer at a time.

use std::collections::HashMap;

/// A user who has opened the App Home at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: String,
    pub channel_id: String,
}

/// The channel zapped messages are forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Store {
    users: HashMap<String, UserRecord>,
    default_channel: Option<ChannelRecord>,
    me: Option<String>,
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_user(&self, id: &str) -> Option<&UserRecord> {
        self.users.get(id)
    }

    /// Inserts the record, replacing any previous one for the same user.
    pub fn add_user(&mut self, record: UserRecord) {
        self.users.insert(record.user_id.clone(), record);
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn get_channel(&self) -> Option<&ChannelRecord> {
        self.default_channel.as_ref()
    }

    pub fn set_channel(&mut self, record: ChannelRecord) {
        self.default_channel = Some(record);
    }

    #[must_use]
    pub fn get_me(&self) -> Option<&str> {
        self.me.as_deref()
    }

    pub fn set_me(&mut self, id: impl Into<String>) {
        self.me = Some(id.into());
    }
}
