//! Short-lived user messages ("No lumber yard with space", ...).

use pastoral_logic::constants::timing::MESSAGE_DURATION;
use thiserror::Error;

use crate::components::ResourceKind;

/// Problems a worker reports to the player instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkIssue {
    #[error("No storage with space for {}", resource_label(.0))]
    NoStorageAvailable(ResourceKind),
    #[error("Storage for {} is full", resource_label(.0))]
    BuildingFull(ResourceKind),
}

fn resource_label(kind: &ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Log => "logs",
        ResourceKind::Stone => "stone",
        ResourceKind::Iron => "iron",
        ResourceKind::Salt => "salt",
        ResourceKind::Wool => "wool",
        ResourceKind::Barley => "barley",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub age: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn push(&mut self, text: impl Into<String>) {
        self.messages.push(Message {
            text: text.into(),
            age: 0.0,
        });
    }

    pub fn report(&mut self, issue: WorkIssue) {
        self.push(issue.to_string());
    }

    /// Age every message and drop the expired ones.
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for m in &mut self.messages {
            m.age += dt;
        }
        self.messages.retain(|m| m.age < MESSAGE_DURATION);
    }

    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
