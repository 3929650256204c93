use crate::{
    app::state::AppState,
    dto::comments::{CommentListResponse, CommentPagination, FilterOption, ListCommentsQuery},
    error::AppResult,
    models::{
        comments::{AuthorOptionRow, ContextItemRow},
        filters::{DEFAULT_PAGE_SIZE, ListFilter, RawFilters, SearchTerm, parse_flag},
    },
    query::comments::context_label_key,
    repositories::{comments as comment_repo, users as user_repo},
    services::{filter_state::FilterStateStore, translations::Translations},
    telemetry::BusinessEvent,
};

/// Screen name of the admin comment list. A `layout` gets its own state.
pub const LIST_SCREEN: &str = "comments";

pub struct CommentAdminService;

impl CommentAdminService {
    pub async fn list_comments(
        state: &AppState,
        user_id: i64,
        query: ListCommentsQuery,
    ) -> AppResult<CommentListResponse> {
        let filter = hydrate_list_filter(&state.filter_state, user_id, &query)?;
        let access = user_repo::load_access_context(
            &state.db,
            user_id,
            state.config.public_access_level,
        )
        .await?;
        let store_id = filter.store_id(&access);

        if let Some(cached) = state.list_cache.get(&store_id) {
            BusinessEvent::CommentListViewed {
                user_id,
                store_id,
                rows: cached.data.len(),
                total: cached.pagination.total,
                cache_hit: true,
            }
            .log();
            return Ok(cached);
        }

        let rows = comment_repo::list_comments(&state.db, &filter, &access).await?;
        let total = comment_repo::count_comments(&state.db, &filter, &access).await?;
        let response = CommentListResponse {
            data: rows.into_iter().map(Into::into).collect(),
            pagination: CommentPagination {
                total,
                limit: filter.page.limit,
                start: filter.page.start,
            },
        };
        state.list_cache.insert(store_id.clone(), response.clone());

        BusinessEvent::CommentListViewed {
            user_id,
            store_id,
            rows: response.data.len(),
            total,
            cache_hit: false,
        }
        .log();

        Ok(response)
    }

    pub async fn list_authors(
        state: &AppState,
        user_id: i64,
        query: ListCommentsQuery,
    ) -> AppResult<Vec<FilterOption<i64>>> {
        let filter = hydrate_list_filter(&state.filter_state, user_id, &query)?;
        let rows =
            comment_repo::list_author_options(&state.db, filter.project, state.config.author_scope)
                .await?;
        let options = author_options(rows);
        log_lookup(user_id, "authors", options.len());
        Ok(options)
    }

    pub async fn list_contexts(
        state: &AppState,
        user_id: i64,
    ) -> AppResult<Vec<FilterOption<String>>> {
        let contexts = comment_repo::list_contexts(&state.db).await?;
        let options = context_options(contexts, &state.translations);
        log_lookup(user_id, "contexts", options.len());
        Ok(options)
    }

    pub async fn list_context_items(
        state: &AppState,
        user_id: i64,
        query: ListCommentsQuery,
    ) -> AppResult<Vec<FilterOption<i64>>> {
        let filter = hydrate_list_filter(&state.filter_state, user_id, &query)?;
        let rows =
            comment_repo::list_context_items(&state.db, filter.context.as_deref(), filter.project)
                .await?;
        let options = context_item_options(rows);
        log_lookup(user_id, "context_items", options.len());
        Ok(options)
    }
}

fn log_lookup(user_id: i64, lookup: &'static str, options: usize) {
    BusinessEvent::CommentLookupServed {
        user_id,
        lookup,
        options,
    }
    .log();
}

pub fn screen_name(layout: Option<&str>) -> String {
    match layout.map(str::trim).filter(|layout| !layout.is_empty()) {
        Some(layout) => format!("{LIST_SCREEN}.{layout}"),
        None => LIST_SCREEN.to_string(),
    }
}

/// Merges the request with the user's remembered screen state and parses the
/// result. Changing a filter or the page size sends the user back to the
/// first page unless the request names a start of its own.
pub fn hydrate_list_filter(
    store: &FilterStateStore,
    user_id: i64,
    query: &ListCommentsQuery,
) -> AppResult<ListFilter> {
    let screen = screen_name(query.layout.as_deref());

    if query.reset.as_deref().and_then(parse_flag) == Some(true) {
        store.reset(user_id, &screen);
        BusinessEvent::FilterStateReset {
            user_id,
            screen: screen.clone(),
        }
        .log();
    }

    // A rejected search must not become the remembered one.
    if let Some(search) = query.search.as_deref() {
        SearchTerm::parse(search)?;
    }

    let mut changed = false;
    let mut filter_value = |key: &'static str, requested: &Option<String>, default: &str| {
        let resolved = store.resolve(user_id, &screen, key, requested.as_deref(), default);
        changed |= resolved.changed;
        resolved.value
    };
    let search = filter_value("filter.search", &query.search, "");
    let published = filter_value("filter.published", &query.published, "");
    let author_id = filter_value("filter.author_id", &query.author_id, "");
    let author_include = filter_value("filter.author_include", &query.author_include, "");
    let context = filter_value("filter.context", &query.context, "");
    let item_id = filter_value("filter.item_id", &query.item_id, "");
    let limit = filter_value("list.limit", &query.limit, &DEFAULT_PAGE_SIZE.to_string());

    let project = store.active_project(user_id, query.project.as_deref());
    changed |= project.changed;

    let ordering = store
        .resolve(user_id, &screen, "list.ordering", query.ordering.as_deref(), "created")
        .value;
    let direction = store
        .resolve(user_id, &screen, "list.direction", query.direction.as_deref(), "desc")
        .value;
    let start = if changed && query.start.is_none() {
        store.remember(user_id, &screen, "list.start", "0");
        "0".to_string()
    } else {
        store
            .resolve(user_id, &screen, "list.start", query.start.as_deref(), "0")
            .value
    };

    let mut filter = RawFilters {
        search,
        published,
        author_id,
        author_include,
        context,
        item_id,
        project: project.value,
        ordering,
        direction,
        limit,
        start,
    }
    .parse()?;

    if filter.context.is_none() || filter.project.is_none() {
        filter.item_id = None;
    }

    Ok(filter)
}

fn author_options(rows: Vec<AuthorOptionRow>) -> Vec<FilterOption<i64>> {
    rows.into_iter()
        .map(|row| FilterOption {
            value: row.value,
            text: row.text,
        })
        .collect()
}

fn context_options(contexts: Vec<String>, translations: &Translations) -> Vec<FilterOption<String>> {
    contexts
        .into_iter()
        .map(|context| FilterOption {
            text: translations.translate(&context_label_key(&context)),
            value: context,
        })
        .collect()
}

fn context_item_options(rows: Vec<ContextItemRow>) -> Vec<FilterOption<i64>> {
    rows.into_iter()
        .map(|row| FilterOption {
            value: row.value,
            text: row.text.unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{
        error::AppError,
        models::filters::{PublishedFilter, SearchTerm, SortColumn},
        query::select::SortDirection,
    };

    fn query() -> ListCommentsQuery {
        ListCommentsQuery::default()
    }

    #[test]
    fn defaults_without_request_or_state() {
        let store = FilterStateStore::new();
        let filter = hydrate_list_filter(&store, 1, &query()).unwrap();
        assert_eq!(filter, ListFilter::default());
        assert_eq!(filter.ordering.column, SortColumn::Created);
        assert_eq!(filter.ordering.direction, SortDirection::Desc);
        assert_eq!(filter.page.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn remembers_filters_between_requests() {
        let store = FilterStateStore::new();
        let first = ListCommentsQuery {
            published: Some("1".to_string()),
            search: Some("author:ann".to_string()),
            ordering: Some("a.title".to_string()),
            direction: Some("asc".to_string()),
            ..query()
        };
        hydrate_list_filter(&store, 1, &first).unwrap();

        let later = hydrate_list_filter(&store, 1, &query()).unwrap();
        assert_eq!(later.published, PublishedFilter::Exact(1));
        assert_eq!(later.search, Some(SearchTerm::Author("ann".to_string())));
        assert_eq!(later.ordering.column, SortColumn::Title);
        assert_eq!(later.ordering.direction, SortDirection::Asc);
    }

    #[test]
    fn changing_a_filter_returns_to_first_page() {
        let store = FilterStateStore::new();
        let paged = ListCommentsQuery {
            start: Some("40".to_string()),
            ..query()
        };
        assert_eq!(hydrate_list_filter(&store, 1, &paged).unwrap().page.start, 40);
        assert_eq!(hydrate_list_filter(&store, 1, &query()).unwrap().page.start, 40);

        let filtered = ListCommentsQuery {
            context: Some("tasks.task".to_string()),
            ..query()
        };
        assert_eq!(hydrate_list_filter(&store, 1, &filtered).unwrap().page.start, 0);
        assert_eq!(hydrate_list_filter(&store, 1, &query()).unwrap().page.start, 0);
    }

    #[test]
    fn re_sorting_keeps_the_page() {
        let store = FilterStateStore::new();
        let paged = ListCommentsQuery {
            start: Some("20".to_string()),
            ..query()
        };
        hydrate_list_filter(&store, 1, &paged).unwrap();
        let sorted = ListCommentsQuery {
            ordering: Some("a.id".to_string()),
            ..query()
        };
        assert_eq!(hydrate_list_filter(&store, 1, &sorted).unwrap().page.start, 20);
    }

    #[test]
    fn item_id_needs_context_and_project() {
        let store = FilterStateStore::new();
        let only_context = ListCommentsQuery {
            context: Some("tasks.task".to_string()),
            item_id: Some("9".to_string()),
            ..query()
        };
        assert_eq!(hydrate_list_filter(&store, 1, &only_context).unwrap().item_id, None);

        let with_project = ListCommentsQuery {
            project: Some("3".to_string()),
            ..query()
        };
        let filter = hydrate_list_filter(&store, 1, &with_project).unwrap();
        assert_eq!(filter.project, Some(3));
        assert_eq!(filter.context.as_deref(), Some("tasks.task"));
        assert_eq!(filter.item_id, Some(9));
    }

    #[test]
    fn project_is_shared_between_layouts() {
        let store = FilterStateStore::new();
        let main = ListCommentsQuery {
            project: Some("5".to_string()),
            search: Some("hello".to_string()),
            ..query()
        };
        hydrate_list_filter(&store, 1, &main).unwrap();

        let modal = ListCommentsQuery {
            layout: Some("modal".to_string()),
            ..query()
        };
        let filter = hydrate_list_filter(&store, 1, &modal).unwrap();
        assert_eq!(filter.project, Some(5));
        assert_eq!(filter.search, None);
    }

    #[test]
    fn reset_forgets_screen_state() {
        let store = FilterStateStore::new();
        let set = ListCommentsQuery {
            published: Some("*".to_string()),
            ..query()
        };
        assert_eq!(hydrate_list_filter(&store, 1, &set).unwrap().published, PublishedFilter::Any);

        let reset = ListCommentsQuery {
            reset: Some("1".to_string()),
            ..query()
        };
        assert_eq!(
            hydrate_list_filter(&store, 1, &reset).unwrap().published,
            PublishedFilter::Default
        );
    }

    #[test]
    fn malformed_id_search_is_rejected() {
        let store = FilterStateStore::new();
        let bad = ListCommentsQuery {
            search: Some("id:abc".to_string()),
            ..query()
        };
        assert!(matches!(
            hydrate_list_filter(&store, 1, &bad),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn rejected_search_is_not_remembered() {
        let store = FilterStateStore::new();
        let valid = ListCommentsQuery {
            search: Some("release".to_string()),
            ..query()
        };
        hydrate_list_filter(&store, 1, &valid).unwrap();

        let bad = ListCommentsQuery {
            search: Some("id:abc".to_string()),
            ..query()
        };
        assert!(hydrate_list_filter(&store, 1, &bad).is_err());

        let follow_up = ListCommentsQuery {
            project: Some("3".to_string()),
            ..query()
        };
        let filter = hydrate_list_filter(&store, 1, &follow_up).unwrap();
        assert_eq!(filter.search, Some(SearchTerm::Text("release".to_string())));
        assert_eq!(filter.project, Some(3));
    }

    #[test]
    fn screen_names_follow_layout() {
        assert_eq!(screen_name(None), "comments");
        assert_eq!(screen_name(Some(" ")), "comments");
        assert_eq!(screen_name(Some("modal")), "comments.modal");
    }

    #[test]
    fn context_options_use_translated_labels() {
        let translations = Translations::from_map(HashMap::from([(
            "TASKS_TASK_TITLE".to_string(),
            "Tasks".to_string(),
        )]));
        let options = context_options(
            vec!["tasks.task".to_string(), "forum.topic".to_string()],
            &translations,
        );
        assert_eq!(
            options,
            vec![
                FilterOption {
                    value: "tasks.task".to_string(),
                    text: "Tasks".to_string(),
                },
                FilterOption {
                    value: "forum.topic".to_string(),
                    text: "FORUM_TOPIC_TITLE".to_string(),
                },
            ]
        );
    }

    #[test]
    fn context_items_without_title_get_empty_text() {
        let options = context_item_options(vec![ContextItemRow {
            value: 4,
            text: None,
        }]);
        assert_eq!(options, vec![FilterOption { value: 4, text: String::new() }]);
    }
}
