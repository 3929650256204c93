use std::collections::BTreeSet;

/// What the caller is allowed to see: the admin capability bypasses view-level
/// filtering entirely, everyone else is limited to `view_levels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    pub user_id: i64,
    pub is_admin: bool,
    pub view_levels: BTreeSet<i32>,
}

impl AccessContext {
    pub fn new(user_id: i64, is_admin: bool, view_levels: impl IntoIterator<Item = i32>) -> Self {
        Self {
            user_id,
            is_admin,
            view_levels: view_levels.into_iter().collect(),
        }
    }

    /// Stable text form of the visibility this context grants. Two callers
    /// with the same fingerprint see the same rows.
    pub fn fingerprint(&self) -> String {
        if self.is_admin {
            return "admin".to_string();
        }
        self.view_levels
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
