//! Static reply payloads keyed by name.
//!
//! The table is built once and shared by every handler. Handlers that need per-channel text
//! call [`Templates::render`], which clones the template before substituting placeholders.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Value, json};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Symbolic names of the reply templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TemplateKey {
    WelcomeAppHome,
    WelcomeChannel,
    AddedToChannel,
    ChannelConfigured,
    Hello,
    ForwardedMessage,
}

/// Text plus optional Block Kit layout, serialized straight into `chat.postMessage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageTemplate {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Value>,
}

impl MessageTemplate {
    #[must_use]
    pub fn new(text: impl Into<String>, blocks: Option<Value>) -> Self {
        Self {
            text: text.into(),
            blocks,
        }
    }

    /// Replaces the first `{{name}}` in every string of the payload with `value`.
    pub fn substitute(&mut self, name: &str, value: &str) {
        let placeholder = format!("{{{{{name}}}}}");
        self.text = self.text.replacen(&placeholder, value, 1);
        if let Some(blocks) = self.blocks.as_mut() {
            substitute_value(blocks, &placeholder, value);
        }
    }

    /// Returns true while any `{{...}}` token is left in the payload.
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        self.text.contains("{{")
            || self
                .blocks
                .as_ref()
                .is_some_and(|blocks| blocks.to_string().contains("{{"))
    }
}

impl From<&str> for MessageTemplate {
    fn from(text: &str) -> Self {
        Self::new(text, None)
    }
}

impl From<String> for MessageTemplate {
    fn from(text: String) -> Self {
        Self::new(text, None)
    }
}

fn substitute_value(value: &mut Value, placeholder: &str, replacement: &str) {
    match value {
        Value::String(s) => {
            if s.contains(placeholder) {
                *s = s.replacen(placeholder, replacement, 1);
            }
        }
        Value::Array(items) => {
            for item in items {
                substitute_value(item, placeholder, replacement);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                substitute_value(item, placeholder, replacement);
            }
        }
        _ => {}
    }
}

#[derive(Debug)]
pub struct Templates {
    table: HashMap<TemplateKey, MessageTemplate>,
}

impl Templates {
    #[must_use]
    pub fn new() -> Self {
        let table = TemplateKey::iter().map(|key| (key, build(key))).collect();
        Self { table }
    }

    /// Shared, read-only view of a template.
    #[must_use]
    pub fn get(&self, key: TemplateKey) -> &MessageTemplate {
        // Every key is inserted in `new`.
        &self.table[&key]
    }

    /// Owned copy of a template with each `(name, value)` substituted.
    #[must_use]
    pub fn render(&self, key: TemplateKey, substitutions: &[(&str, &str)]) -> MessageTemplate {
        let mut message = self.get(key).clone();
        for (name, value) in substitutions {
            message.substitute(name, value);
        }
        message
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}

fn section(text: &str) -> Value {
    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": text }
    })
}

fn channel_select(text: &str, action_id: &str) -> Value {
    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": text },
        "accessory": {
            "action_id": action_id,
            "type": "channels_select",
            "placeholder": {
                "type": "plain_text",
                "text": "Select channel",
                "emoji": true
            }
        }
    })
}

fn divider() -> Value {
    json!({ "type": "divider" })
}

const SUMMARY: &str = "Hi there! Bolt is a simple app that forwards messages to another channel \
    when you react to them with the :zap: emoji.";

const APP_HOME_INTRO: &str = "Hi there! \n\n Bolt is a simple app that forwards messages to \
    another channel when you react to them with the :zap: emoji. \n\n Before we start, let's \
    pick the channel all messages should be forwarded to.";

const CHANNEL_INTRO: &str = "Hi there! \n\n Bolt is a simple app that forwards messages from this \
    channel to <#{{channelId}}|{{channelName}}> when you react to them with the :zap: emoji.";

const CONFIGURED: &str =
    ":tada: Bolt's default channel is configured as *<#{{channelId}}|{{channelName}}>*";

const INVITE_HINT: &str = "Invite Bolt to a channel by typing `/invite` in it, or just pick a \
    channel from the dropdown below.";

const FORWARDED: &str =
    ":zap: {{userName}} forwarded a message from <#{{channelId}}>: {{permalink}}";

const FORWARDED_BLOCK: &str =
    ":zap: *{{userName}}* forwarded a message from <#{{channelId}}>\n{{permalink}}";

fn build(key: TemplateKey) -> MessageTemplate {
    match key {
        TemplateKey::WelcomeAppHome => {
            let blocks = json!([
                section(APP_HOME_INTRO),
                divider(),
                channel_select(
                    "*Pick a channel from the dropdown list*",
                    "configure_channel",
                ),
            ]);
            MessageTemplate::new(SUMMARY, Some(blocks))
        }
        TemplateKey::WelcomeChannel => {
            let blocks = json!([section(CHANNEL_INTRO)]);
            MessageTemplate::new(SUMMARY, Some(blocks))
        }
        TemplateKey::AddedToChannel => {
            let text = ":zap: Bolt has been invited to *<#{{channelId}}|{{channelName}}>*";
            let blocks = json!([section(text)]);
            MessageTemplate::new("Bolt has been invited to a channel", Some(blocks))
        }
        TemplateKey::ChannelConfigured => {
            let text = "Bolt's default channel is configured as <#{{channelId}}|{{channelName}}>";
            let blocks = json!([
                section(CONFIGURED),
                divider(),
                section(INVITE_HINT),
                channel_select("*Invite Bolt to a channel*", "add_to_channel"),
            ]);
            MessageTemplate::new(text, Some(blocks))
        }
        TemplateKey::Hello => {
            let blocks = json!([{
                "type": "section",
                "text": { "type": "mrkdwn", "text": "Hey there <@{{userId}}>!" },
                "accessory": {
                    "type": "button",
                    "text": { "type": "plain_text", "text": "Click Me" },
                    "action_id": "button_click"
                }
            }]);
            MessageTemplate::new("Hey there <@{{userId}}>!", Some(blocks))
        }
        TemplateKey::ForwardedMessage => {
            MessageTemplate::new(FORWARDED, Some(json!([section(FORWARDED_BLOCK)])))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_a_template() {
        let templates = Templates::new();
        for key in TemplateKey::iter() {
            assert!(!templates.get(key).text.is_empty(), "{key} has no text");
        }
    }

    #[test]
    fn keys_use_snake_case_names() {
        let name = TemplateKey::ChannelConfigured.to_string();
        assert_eq!(name, "channel_configured");
        assert_eq!(
            "welcome_app_home".parse::<TemplateKey>().ok(),
            Some(TemplateKey::WelcomeAppHome)
        );
    }

    #[test]
    fn render_leaves_shared_template_untouched() {
        let templates = Templates::new();
        let rendered = templates.render(
            TemplateKey::WelcomeChannel,
            &[("channelId", "C1"), ("channelName", "general")],
        );
        assert!(!rendered.has_placeholders());
        let rendered_blocks = rendered.blocks.expect("blocks").to_string();
        assert!(rendered_blocks.contains("<#C1|general>"));

        let fresh = templates.get(TemplateKey::WelcomeChannel);
        let blocks = fresh.blocks.as_ref().expect("blocks").to_string();
        assert!(blocks.contains("{{channelId}}"));
        assert!(blocks.contains("{{channelName}}"));
    }

    #[test]
    fn substitute_replaces_first_occurrence_per_string() {
        let mut message = MessageTemplate::new("{{name}} and {{name}}", None);
        message.substitute("name", "x");
        assert_eq!(message.text, "x and {{name}}");
    }

    #[test]
    fn substitute_reaches_nested_blocks() {
        let mut message = MessageTemplate::new(
            "plain",
            Some(json!([{ "elements": [{ "text": "<#{{channelId}}>" }], "count": 3 }])),
        );
        message.substitute("channelId", "C9");
        assert_eq!(
            message.blocks,
            Some(json!([{ "elements": [{ "text": "<#C9>" }], "count": 3 }]))
        );
    }

    #[test]
    fn plain_text_serializes_without_blocks() {
        let value = serde_json::to_value(MessageTemplate::from("pong")).expect("serializes");
        assert_eq!(value, json!({ "text": "pong" }));
    }
}
