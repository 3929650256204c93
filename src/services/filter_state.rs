use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;

/// Per-user memory of the admin screen filters, so a filter set once sticks
/// across page loads until the user changes it. Screens are keyed by name;
/// the active project is shared by every screen of the same user.
#[derive(Clone, Default)]
pub struct FilterStateStore {
    screens: Arc<DashMap<(i64, String), HashMap<&'static str, String>>>,
    active_projects: Arc<DashMap<i64, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    /// The request carried a value different from the remembered one.
    pub changed: bool,
}

impl FilterStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A requested value wins and is remembered. Without one, the remembered
    /// value is used, then `default`.
    pub fn resolve(
        &self,
        user_id: i64,
        screen: &str,
        key: &'static str,
        requested: Option<&str>,
        default: &str,
    ) -> Resolved {
        let mut state = self
            .screens
            .entry((user_id, screen.to_string()))
            .or_default();
        match requested {
            Some(value) => {
                let previous = state.insert(key, value.to_string());
                let changed = previous.as_deref().unwrap_or(default) != value;
                Resolved {
                    value: value.to_string(),
                    changed,
                }
            }
            None => Resolved {
                value: state
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| default.to_string()),
                changed: false,
            },
        }
    }

    pub fn remember(&self, user_id: i64, screen: &str, key: &'static str, value: &str) {
        self.screens
            .entry((user_id, screen.to_string()))
            .or_default()
            .insert(key, value.to_string());
    }

    pub fn active_project(&self, user_id: i64, requested: Option<&str>) -> Resolved {
        match requested {
            Some(value) => {
                let previous = self.active_projects.insert(user_id, value.to_string());
                Resolved {
                    value: value.to_string(),
                    changed: previous.as_deref().unwrap_or("") != value,
                }
            }
            None => Resolved {
                value: self
                    .active_projects
                    .get(&user_id)
                    .map(|project| project.value().clone())
                    .unwrap_or_default(),
                changed: false,
            },
        }
    }

    /// Forgets the screen filters. The active project survives.
    pub fn reset(&self, user_id: i64, screen: &str) {
        self.screens.remove(&(user_id, screen.to_string()));
    }
}
