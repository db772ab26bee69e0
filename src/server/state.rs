use axum::extract::FromRef;

use crate::chat::ChatService;
use crate::eeg_feed::EegFeed;
use crate::facial::FacialClassifier;
use crate::user::UserManager;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserManager = Arc<UserManager>;
pub type GuardedChatService = Arc<ChatService>;
pub type OptionalFacialClassifier = Option<Arc<dyn FacialClassifier>>;
pub type GuardedEegFeed = Arc<dyn EegFeed>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub user_manager: GuardedUserManager,
    pub chat_service: GuardedChatService,
    pub facial_classifier: OptionalFacialClassifier,
    pub eeg_feed: GuardedEegFeed,
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedChatService {
    fn from_ref(input: &ServerState) -> Self {
        input.chat_service.clone()
    }
}

impl FromRef<ServerState> for OptionalFacialClassifier {
    fn from_ref(input: &ServerState) -> Self {
        input.facial_classifier.clone()
    }
}

impl FromRef<ServerState> for GuardedEegFeed {
    fn from_ref(input: &ServerState) -> Self {
        input.eeg_feed.clone()
    }
}
