use super::{HashIndex, JsonFileIndex, SessionIndex};
use crate::config::{IndexMode, StoreConfig};
use crate::error::VaultResult;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Resolves which index serves a given chat
#[derive(Clone)]
pub enum IndexRegistry {
    /// One durable index shared by every chat
    Shared(Arc<dyn HashIndex>),
    /// A capacity-1 index per chat, created on first use
    PerChat(Arc<RwLock<HashMap<i64, Arc<SessionIndex>>>>),
}

impl IndexRegistry {
    /// Build the registry described by the store configuration
    pub async fn from_config(config: &StoreConfig) -> VaultResult<Self> {
        match config.index_mode {
            IndexMode::Persistent => {
                let index = JsonFileIndex::open(&config.index_file).await?;
                Ok(IndexRegistry::Shared(Arc::new(index)))
            }
            IndexMode::Session => Ok(IndexRegistry::per_chat()),
        }
    }

    /// Wrap an existing index, e.g. a `MemoryIndex` in tests
    pub fn shared(index: Arc<dyn HashIndex>) -> Self {
        IndexRegistry::Shared(index)
    }

    pub fn per_chat() -> Self {
        IndexRegistry::PerChat(Arc::new(RwLock::new(HashMap::new())))
    }

    /// Index that serves `chat_id`
    pub fn for_chat(&self, chat_id: i64) -> Arc<dyn HashIndex> {
        match self {
            IndexRegistry::Shared(index) => Arc::clone(index),
            IndexRegistry::PerChat(sessions) => {
                {
                    let sessions = sessions.read().unwrap_or_else(|e| e.into_inner());
                    if let Some(index) = sessions.get(&chat_id) {
                        return Arc::clone(index) as Arc<dyn HashIndex>;
                    }
                }

                let mut sessions = sessions.write().unwrap_or_else(|e| e.into_inner());
                let index = sessions
                    .entry(chat_id)
                    .or_insert_with(|| Arc::new(SessionIndex::new()));
                Arc::clone(index) as Arc<dyn HashIndex>
            }
        }
    }

    /// The chat-independent index, if this mode has one
    pub fn global(&self) -> Option<Arc<dyn HashIndex>> {
        match self {
            IndexRegistry::Shared(index) => Some(Arc::clone(index)),
            IndexRegistry::PerChat(_) => None,
        }
    }
}
