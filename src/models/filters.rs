use sha2::{Digest, Sha256};

use crate::{error::AppError, models::users::AccessContext, query::select::SortDirection};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 500;

/// Publication-state filter. `Default` is the regular admin view (unpublished
/// and published only); `Any` shows archived and trashed rows too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishedFilter {
    #[default]
    Default,
    Exact(i32),
    Any,
}

impl PublishedFilter {
    /// Empty text selects the default view, a number selects one state and any
    /// other value disables the filter.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return PublishedFilter::Default;
        }
        match raw.trim().parse::<i32>() {
            Ok(state) => PublishedFilter::Exact(state),
            Err(_) => PublishedFilter::Any,
        }
    }

    fn key(self) -> String {
        match self {
            PublishedFilter::Default => String::new(),
            PublishedFilter::Exact(state) => state.to_string(),
            PublishedFilter::Any => "*".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorFilter {
    pub user_id: i64,
    /// `false` turns the filter into "everyone but this author".
    pub include: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    Id(i64),
    Author(String),
    Text(String),
}

impl SearchTerm {
    const ID_PREFIX: &'static str = "id:";
    const AUTHOR_PREFIX: &'static str = "author:";

    pub fn parse(raw: &str) -> Result<Option<Self>, AppError> {
        if raw.is_empty() {
            return Ok(None);
        }
        if let Some(rest) = strip_prefix_ignore_case(raw, Self::ID_PREFIX) {
            let id = rest.trim().parse::<i64>().map_err(|_| {
                AppError::ValidationError(format!(
                    "Search '{raw}' must be followed by a numeric comment id"
                ))
            })?;
            return Ok(Some(SearchTerm::Id(id)));
        }
        if let Some(rest) = strip_prefix_ignore_case(raw, Self::AUTHOR_PREFIX) {
            return Ok(Some(SearchTerm::Author(rest.to_string())));
        }
        Ok(Some(SearchTerm::Text(raw.to_string())))
    }

    fn key(&self) -> String {
        match self {
            SearchTerm::Id(id) => format!("id:{id}"),
            SearchTerm::Author(name) => format!("author:{name}"),
            SearchTerm::Text(text) => text.clone(),
        }
    }
}

fn strip_prefix_ignore_case<'a>(raw: &'a str, prefix: &str) -> Option<&'a str> {
    let head = raw.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &raw[prefix.len()..])
}

/// Columns the list may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    Id,
    ProjectId,
    ProjectTitle,
    Title,
    Description,
    #[default]
    Created,
    CreatedBy,
    Modified,
    ModifiedBy,
    CheckedOut,
    CheckedOutTime,
    Access,
    State,
    Context,
    Lft,
}

impl SortColumn {
    /// Accepts bare (`created`) and table-qualified (`a.created`) names.
    pub fn parse(raw: &str) -> Option<Self> {
        let name = raw.trim();
        let name = name.strip_prefix("a.").unwrap_or(name);
        let column = match name {
            "id" => SortColumn::Id,
            "project_id" => SortColumn::ProjectId,
            "project_title" => SortColumn::ProjectTitle,
            "title" => SortColumn::Title,
            "description" => SortColumn::Description,
            "created" => SortColumn::Created,
            "created_by" => SortColumn::CreatedBy,
            "modified" => SortColumn::Modified,
            "modified_by" => SortColumn::ModifiedBy,
            "checked_out" => SortColumn::CheckedOut,
            "checked_out_time" => SortColumn::CheckedOutTime,
            "access" => SortColumn::Access,
            "state" => SortColumn::State,
            "context" => SortColumn::Context,
            "lft" => SortColumn::Lft,
            _ => return None,
        };
        Some(column)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::ProjectId => "project_id",
            SortColumn::ProjectTitle => "project_title",
            SortColumn::Title => "title",
            SortColumn::Description => "description",
            SortColumn::Created => "created",
            SortColumn::CreatedBy => "created_by",
            SortColumn::Modified => "modified",
            SortColumn::ModifiedBy => "modified_by",
            SortColumn::CheckedOut => "checked_out",
            SortColumn::CheckedOutTime => "checked_out_time",
            SortColumn::Access => "access",
            SortColumn::State => "state",
            SortColumn::Context => "context",
            SortColumn::Lft => "lft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOrdering {
    pub column: SortColumn,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Zero means every row, the "All" choice of the page-size picker. The
    /// `MAX_PAGE_SIZE` cap only bounds explicit sizes.
    pub limit: u32,
    pub start: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            start: 0,
        }
    }
}

/// Which authors the author dropdown offers once a project is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorScope {
    /// Every user who ever authored a comment, whatever the project.
    #[default]
    AllProjects,
    SelectedProject,
}

impl AuthorScope {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(AuthorScope::AllProjects),
            "project" => Some(AuthorScope::SelectedProject),
            _ => None,
        }
    }
}

/// Fully resolved filter state for the admin comment list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListFilter {
    pub project: Option<i64>,
    pub published: PublishedFilter,
    pub author: Option<AuthorFilter>,
    pub context: Option<String>,
    pub item_id: Option<i64>,
    pub search: Option<SearchTerm>,
    pub ordering: ListOrdering,
    pub page: Page,
}

impl ListFilter {
    /// Cache key covering every input that changes the result page,
    /// including what the caller is allowed to see.
    pub fn store_id(&self, access: &AccessContext) -> String {
        let author = self
            .author
            .map(|author| format!("{}{}", if author.include { "" } else { "!" }, author.user_id))
            .unwrap_or_default();
        let parts = [
            self.search.as_ref().map(SearchTerm::key).unwrap_or_default(),
            self.published.key(),
            access.fingerprint(),
            author,
            self.project.map(|id| id.to_string()).unwrap_or_default(),
            self.context.clone().unwrap_or_default(),
            self.item_id.map(|id| id.to_string()).unwrap_or_default(),
            self.ordering.column.as_str().to_string(),
            self.ordering.direction.as_sql().to_string(),
            self.page.limit.to_string(),
            self.page.start.to_string(),
        ];

        let mut hasher = Sha256::new();
        for part in &parts {
            hasher.update(part.as_bytes());
            hasher.update([0x1f_u8]);
        }
        hex::encode(hasher.finalize())
    }
}

/// Filter values as text, the way they arrive from a request or from
/// remembered screen state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilters {
    pub search: String,
    pub published: String,
    pub author_id: String,
    pub author_include: String,
    pub context: String,
    pub item_id: String,
    pub project: String,
    pub ordering: String,
    pub direction: String,
    pub limit: String,
    pub start: String,
}

impl RawFilters {
    /// Values that do not parse are treated as absent. Only a malformed `id:`
    /// search is rejected.
    pub fn parse(&self) -> Result<ListFilter, AppError> {
        let project = parse_id(&self.project).filter(|id| *id != 0);
        let author = parse_id(&self.author_id).map(|user_id| AuthorFilter {
            user_id,
            include: parse_flag(&self.author_include).unwrap_or(true),
        });
        let context = Some(self.context.trim())
            .filter(|context| !context.is_empty())
            .map(str::to_string);
        let limit = self
            .limit
            .trim()
            .parse::<u32>()
            .map(|limit| limit.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let start = self.start.trim().parse::<u32>().unwrap_or(0);

        Ok(ListFilter {
            project,
            published: PublishedFilter::parse(&self.published),
            author,
            context,
            item_id: parse_id(&self.item_id),
            search: SearchTerm::parse(&self.search)?,
            ordering: ListOrdering {
                column: SortColumn::parse(&self.ordering).unwrap_or_default(),
                direction: SortDirection::parse(&self.direction).unwrap_or_default(),
            },
            page: Page { limit, start },
        })
    }
}

pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "include" => Some(true),
        "0" | "false" | "exclude" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawFilters {
        RawFilters::default()
    }

    #[test]
    fn empty_published_selects_default_view() {
        assert_eq!(PublishedFilter::parse(""), PublishedFilter::Default);
        assert_eq!(PublishedFilter::parse("1"), PublishedFilter::Exact(1));
        assert_eq!(PublishedFilter::parse("-2"), PublishedFilter::Exact(-2));
        assert_eq!(PublishedFilter::parse("*"), PublishedFilter::Any);
    }

    #[test]
    fn zero_or_garbage_project_means_all_projects() {
        for value in ["", "0", "abc"] {
            let filters = RawFilters {
                project: value.to_string(),
                ..raw()
            };
            assert_eq!(filters.parse().unwrap().project, None, "project {value:?}");
        }
        let filters = RawFilters {
            project: "7".to_string(),
            ..raw()
        };
        assert_eq!(filters.parse().unwrap().project, Some(7));
    }

    #[test]
    fn author_defaults_to_include_mode() {
        let filters = RawFilters {
            author_id: "5".to_string(),
            ..raw()
        };
        assert_eq!(
            filters.parse().unwrap().author,
            Some(AuthorFilter {
                user_id: 5,
                include: true
            })
        );

        let filters = RawFilters {
            author_id: "5".to_string(),
            author_include: "false".to_string(),
            ..raw()
        };
        assert!(!filters.parse().unwrap().author.unwrap().include);
    }

    #[test]
    fn non_numeric_item_id_is_ignored() {
        let filters = RawFilters {
            item_id: "twelve".to_string(),
            ..raw()
        };
        assert_eq!(filters.parse().unwrap().item_id, None);
    }

    #[test]
    fn search_dispatches_on_prefix() {
        assert_eq!(SearchTerm::parse("").unwrap(), None);
        assert_eq!(SearchTerm::parse("id:42").unwrap(), Some(SearchTerm::Id(42)));
        assert_eq!(SearchTerm::parse("ID: 42").unwrap(), Some(SearchTerm::Id(42)));
        assert_eq!(
            SearchTerm::parse("Author:ann").unwrap(),
            Some(SearchTerm::Author("ann".to_string()))
        );
        assert_eq!(
            SearchTerm::parse("50% done").unwrap(),
            Some(SearchTerm::Text("50% done".to_string()))
        );
    }

    #[test]
    fn malformed_id_search_is_rejected() {
        let result = SearchTerm::parse("id:");
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        let result = SearchTerm::parse("id:abc");
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn short_search_does_not_panic_on_char_boundary() {
        assert_eq!(
            SearchTerm::parse("é").unwrap(),
            Some(SearchTerm::Text("é".to_string()))
        );
    }

    #[test]
    fn unknown_ordering_falls_back_to_created_desc() {
        let filters = RawFilters {
            ordering: "a.password; DROP TABLE".to_string(),
            direction: "up".to_string(),
            ..raw()
        };
        let ordering = filters.parse().unwrap().ordering;
        assert_eq!(ordering.column, SortColumn::Created);
        assert_eq!(ordering.direction, SortDirection::Desc);
    }

    #[test]
    fn qualified_ordering_is_accepted() {
        assert_eq!(SortColumn::parse("a.lft"), Some(SortColumn::Lft));
        assert_eq!(SortColumn::parse("project_title"), Some(SortColumn::ProjectTitle));
    }

    #[test]
    fn page_size_is_capped() {
        let filters = RawFilters {
            limit: "100000".to_string(),
            ..raw()
        };
        assert_eq!(filters.parse().unwrap().page.limit, MAX_PAGE_SIZE);
        assert_eq!(raw().parse().unwrap().page.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn zero_page_size_selects_every_row() {
        let filters = RawFilters {
            limit: "0".to_string(),
            ..raw()
        };
        assert_eq!(filters.parse().unwrap().page.limit, 0);
    }

    #[test]
    fn store_id_changes_with_every_result_affecting_input() {
        let access = AccessContext::new(1, false, [1, 2]);
        let base = ListFilter::default();
        let base_id = base.store_id(&access);
        assert_eq!(base_id.len(), 64);
        assert_eq!(base_id, ListFilter::default().store_id(&access));

        let variants = [
            ListFilter {
                context: Some("tasks.task".to_string()),
                ..ListFilter::default()
            },
            ListFilter {
                item_id: Some(3),
                ..ListFilter::default()
            },
            ListFilter {
                published: PublishedFilter::Any,
                ..ListFilter::default()
            },
            ListFilter {
                author: Some(AuthorFilter {
                    user_id: 5,
                    include: false,
                }),
                ..ListFilter::default()
            },
        ];
        for variant in variants {
            assert_ne!(variant.store_id(&access), base_id, "{variant:?}");
        }

        let admin = AccessContext::new(1, true, [1, 2]);
        assert_ne!(base.store_id(&admin), base_id);
    }
}
