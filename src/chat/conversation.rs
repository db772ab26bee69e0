//! Per-user in-memory conversation buffers.

use super::llm::Message;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub type Clock = Arc<dyn Fn() -> Instant + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationPolicy {
    /// Idle time after which a conversation is forgotten. `None` keeps it
    /// until explicitly cleared.
    pub ttl: Option<Duration>,
    /// Oldest messages are dropped beyond this length.
    pub max_messages: usize,
}

impl Default for ConversationPolicy {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::from_secs(60 * 60)),
            max_messages: 40,
        }
    }
}

struct Conversation {
    messages: VecDeque<Message>,
    last_active: Instant,
}

pub struct ConversationStore {
    policy: ConversationPolicy,
    clock: Clock,
    conversations: Mutex<HashMap<String, Conversation>>,
}

impl ConversationStore {
    pub fn new(policy: ConversationPolicy) -> Self {
        Self::with_clock(policy, Arc::new(Instant::now))
    }

    pub fn with_clock(policy: ConversationPolicy, clock: Clock) -> Self {
        Self {
            policy,
            clock,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> ConversationPolicy {
        self.policy
    }

    fn is_expired(&self, conversation: &Conversation, now: Instant) -> bool {
        match self.policy.ttl {
            Some(ttl) => now.saturating_duration_since(conversation.last_active) >= ttl,
            None => false,
        }
    }

    /// Messages exchanged so far with `user_handle`, oldest first.
    pub fn history(&self, user_handle: &str) -> Vec<Message> {
        let now = (self.clock)();
        let mut conversations = self.conversations.lock().unwrap();
        match conversations.get(user_handle) {
            Some(c) if self.is_expired(c, now) => {
                conversations.remove(user_handle);
                vec![]
            }
            Some(c) => c.messages.iter().cloned().collect(),
            None => vec![],
        }
    }

    pub fn append(&self, user_handle: &str, messages: impl IntoIterator<Item = Message>) {
        let now = (self.clock)();
        let mut conversations = self.conversations.lock().unwrap();

        let expired = conversations
            .get(user_handle)
            .is_some_and(|c| self.is_expired(c, now));
        if expired {
            conversations.remove(user_handle);
        }

        let conversation = conversations
            .entry(user_handle.to_string())
            .or_insert_with(|| Conversation {
                messages: VecDeque::new(),
                last_active: now,
            });
        conversation.messages.extend(messages);
        while conversation.messages.len() > self.policy.max_messages {
            conversation.messages.pop_front();
        }
        conversation.last_active = now;
    }

    /// Returns whether there was anything to clear.
    pub fn clear(&self, user_handle: &str) -> bool {
        self.conversations
            .lock()
            .unwrap()
            .remove(user_handle)
            .is_some()
    }

    /// Drops every expired conversation, returning how many were dropped.
    pub fn prune_expired(&self) -> usize {
        let now = (self.clock)();
        let mut conversations = self.conversations.lock().unwrap();
        let before = conversations.len();
        conversations.retain(|_, c| !self.is_expired(c, now));
        before - conversations.len()
    }

    pub fn len(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
