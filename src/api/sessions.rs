use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{new_scope_path, ConversationSession};

/// Owns every live `ConversationSession`, one per user interaction context.
/// Each session sits behind its own async mutex so a turn runs exclusively;
/// a second in-flight turn on the same session is rejected by the caller via
/// `try_lock`.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<ConversationSession>>>>,
    slide_window: usize,
}

impl SessionRegistry {
    pub fn new(slide_window: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            slide_window,
        }
    }

    pub fn create(&self) -> (Uuid, String) {
        let session = ConversationSession::new(new_scope_path()).with_slide_window(self.slide_window);
        let id = session.id;
        let scope_id = session.scope_id.clone();

        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(id, Arc::new(Mutex::new(session)));
        }

        (id, scope_id)
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Mutex<ConversationSession>>> {
        self.sessions.read().ok()?.get(id).cloned()
    }

    pub fn remove(&self, id: &Uuid) -> Option<Arc<Mutex<ConversationSession>>> {
        self.sessions.write().ok()?.remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
