//! Named user allow-lists.
//!
//! A command can name an allow-list (`!cmd/allow friends`); users on that
//! list pass the rights gate regardless of their roles. List names are
//! normalized once, when they are set: lower-cased with a `.users` suffix.
//! User names are stored and looked up lower-cased.

use dashmap::{DashMap, DashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// File suffix and normalized list-name suffix.
pub const LIST_SUFFIX: &str = ".users";

/// Lookup side of the allow-list collaborator.
pub trait UserLists: Send + Sync {
    /// Whether `user` (already lower-cased) is on the list `list` (already
    /// normalized with [`normalize_list_name`]).
    fn contains(&self, list: &str, user: &str) -> bool;
}

/// Normalize an allow-list name: lower-case, with a `.users` suffix.
pub fn normalize_list_name(name: &str) -> String {
    let mut fixed = name.trim().to_lowercase();
    if !fixed.ends_with(LIST_SUFFIX) {
        fixed.push_str(LIST_SUFFIX);
    }
    fixed
}

/// In-memory allow-lists, safe to share across tasks.
#[derive(Debug, Default)]
pub struct MemoryUserLists {
    lists: DashMap<String, DashSet<String>>,
}

impl MemoryUserLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user to a list, creating the list if needed.
    pub fn add(&self, list: &str, user: &str) {
        self.lists
            .entry(normalize_list_name(list))
            .or_default()
            .insert(user.trim().to_lowercase());
    }

    /// Remove a user from a list. Returns whether the user was present.
    pub fn remove(&self, list: &str, user: &str) -> bool {
        self.lists
            .get(&normalize_list_name(list))
            .map(|set| set.remove(&user.trim().to_lowercase()).is_some())
            .unwrap_or(false)
    }

    /// Number of users on a list.
    pub fn len(&self, list: &str) -> usize {
        self.lists
            .get(&normalize_list_name(list))
            .map(|set| set.len())
            .unwrap_or(0)
    }

    /// Load every `*.users` file in `dir`, one user per line. Blank lines and
    /// lines starting with `#` are skipped. Unreadable files are logged and
    /// skipped.
    pub fn load_dir(dir: &Path) -> Self {
        let lists = Self::new();
        let pattern = dir.join(format!("*{LIST_SUFFIX}"));

        let paths = match glob::glob(&pattern.to_string_lossy()) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Invalid allow-list directory pattern");
                return lists;
            }
        };

        for path in paths.flatten() {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let name = name.to_string();

            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    let mut count = 0usize;
                    for line in content.lines().map(str::trim) {
                        if line.is_empty() || line.starts_with('#') {
                            continue;
                        }
                        lists.add(&name, line);
                        count += 1;
                    }
                    debug!(list = %name, users = count, "Loaded allow-list");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read allow-list");
                }
            }
        }

        info!(lists = lists.lists.len(), dir = %dir.display(), "Loaded allow-lists");
        lists
    }
}

impl UserLists for MemoryUserLists {
    fn contains(&self, list: &str, user: &str) -> bool {
        self.lists
            .get(list)
            .map(|set| set.contains(user))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn list_names_are_normalized_once() {
        assert_eq!(normalize_list_name("Friends"), "friends.users");
        assert_eq!(normalize_list_name("friends.users"), "friends.users");
        assert_eq!(normalize_list_name(" MODS "), "mods.users");
    }

    #[test]
    fn add_and_remove_users() {
        let lists = MemoryUserLists::new();
        lists.add("Friends", "Alice");
        lists.add("friends.users", "bob");

        assert!(lists.contains("friends.users", "alice"));
        assert!(lists.contains("friends.users", "bob"));
        assert_eq!(lists.len("friends"), 2);

        assert!(lists.remove("friends", "ALICE"));
        assert!(!lists.remove("friends", "alice"));
        assert!(!lists.contains("friends.users", "alice"));
    }

    #[test]
    fn unknown_list_contains_nobody() {
        let lists = MemoryUserLists::new();
        assert!(!lists.contains("ghosts.users", "alice"));
    }

    #[test]
    fn load_dir_reads_users_files() {
        let dir = tempfile::tempdir().unwrap();

        let mut f = std::fs::File::create(dir.path().join("mappers.users")).unwrap();
        writeln!(f, "# trusted mappers").unwrap();
        writeln!(f, "Alice").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "  bob  ").unwrap();

        std::fs::write(dir.path().join("notes.txt"), "carol\n").unwrap();

        let lists = MemoryUserLists::load_dir(dir.path());
        assert!(lists.contains("mappers.users", "alice"));
        assert!(lists.contains("mappers.users", "bob"));
        assert_eq!(lists.len("mappers"), 2);
        assert!(!lists.contains("notes.users", "carol"));
    }
}
