//! Router harness: builds a router over in-memory collaborators and
//! captures everything it says.

use chatgate::config::{HelpConfig, LimitsConfig};
use chatgate::handlers::HelpFormatter;
use chatgate::history::MemoryHistory;
use chatgate::history::memory::PlayedSong;
use chatgate::lists::MemoryUserLists;
use chatgate::{ChatSink, ChatUser, CmdFlags, CommandRegistry, Router};
use std::collections::HashMap;
use std::sync::Arc;

pub struct TestRouter {
    pub router: Router,
    pub lists: Arc<MemoryUserLists>,
    pub history: Arc<MemoryHistory>,
}

#[allow(dead_code)]
impl TestRouter {
    pub fn new(registry: CommandRegistry) -> Self {
        Self::with_limits(registry, LimitsConfig::default())
    }

    pub fn with_limits(registry: CommandRegistry, limits: LimitsConfig) -> Self {
        let mut links = HashMap::new();
        links.insert("beatsaver".to_string(), "https://beatsaver.com".to_string());
        let help = HelpFormatter::new(&HelpConfig {
            link_base: Some("https://example.org/commands/".to_string()),
            links,
        });

        let lists = Arc::new(MemoryUserLists::new());
        let history = Arc::new(MemoryHistory::new(10));
        let router = Router::new(registry, lists.clone(), history.clone(), help, limits);
        Self {
            router,
            lists,
            history,
        }
    }

    /// Dispatch `line` as `user` and return what was said in chat.
    pub async fn say(&self, user: &ChatUser, line: &str) -> Vec<String> {
        self.say_with(user, line, CmdFlags::empty(), "").await
    }

    pub async fn say_with(&self, user: &ChatUser, line: &str, flags: CmdFlags, info: &str) -> Vec<String> {
        let (sink, out) = ChatSink::capturing();
        self.router.dispatch(user, line, flags, info, &sink).await;
        let said = out.lock().await.clone();
        said
    }

    pub fn played(&self, title: &str, version: Option<&str>) {
        self.history.push(PlayedSong {
            title: title.to_string(),
            version: version.map(str::to_string),
        });
    }
}

pub fn broadcaster() -> ChatUser {
    ChatUser::broadcaster("Streamer")
}

#[allow(dead_code)]
pub fn moderator() -> ChatUser {
    ChatUser::moderator("Modder")
}

#[allow(dead_code)]
pub fn subscriber() -> ChatUser {
    ChatUser::subscriber("Subby")
}

#[allow(dead_code)]
pub fn vip() -> ChatUser {
    ChatUser {
        display_name: "Vippy".to_string(),
        is_vip: true,
        ..Default::default()
    }
}

pub fn viewer() -> ChatUser {
    ChatUser::viewer("Lurker")
}
