//! Query builders behind the admin comment screen. All of them are pure: they
//! take resolved filter state and return a [`SelectQuery`] for the storage
//! adapter, so the filtering rules can be exercised without a database.

use crate::{
    models::{
        comments::{ROOT_ALIAS, STATE_PUBLISHED, STATE_UNPUBLISHED},
        filters::{AuthorScope, ListFilter, PublishedFilter, SearchTerm, SortColumn},
        users::AccessContext,
    },
    query::select::{
        Column, Expr, Join, OrderTerm, Predicate, SelectItem, SelectQuery, TableRef, Value,
    },
};

pub const COMMENTS: TableRef = TableRef::new("collab.comment", "a");
pub const EDITORS: TableRef = TableRef::new("core.user", "uc");
pub const AUTHORS: TableRef = TableRef::new("core.user", "ua");
pub const PROJECTS: TableRef = TableRef::new("project.project", "p");
pub const USERS: TableRef = TableRef::new("core.user", "u");

pub mod cols {
    use crate::query::select::Column;

    pub const ID: Column = Column::new("a", "id");
    pub const PROJECT_ID: Column = Column::new("a", "project_id");
    pub const PARENT_ID: Column = Column::new("a", "parent_id");
    pub const TITLE: Column = Column::new("a", "title");
    pub const ALIAS: Column = Column::new("a", "alias");
    pub const DESCRIPTION: Column = Column::new("a", "description");
    pub const CONTEXT: Column = Column::new("a", "context");
    pub const ITEM_ID: Column = Column::new("a", "item_id");
    pub const CHECKED_OUT: Column = Column::new("a", "checked_out");
    pub const CHECKED_OUT_TIME: Column = Column::new("a", "checked_out_time");
    pub const STATE: Column = Column::new("a", "state");
    pub const ACCESS: Column = Column::new("a", "access");
    pub const CREATED: Column = Column::new("a", "created");
    pub const CREATED_BY: Column = Column::new("a", "created_by");
    pub const MODIFIED: Column = Column::new("a", "modified");
    pub const MODIFIED_BY: Column = Column::new("a", "modified_by");
    pub const LFT: Column = Column::new("a", "lft");
    pub const RGT: Column = Column::new("a", "rgt");
    pub const LEVEL: Column = Column::new("a", "level");

    pub const EDITOR_ID: Column = Column::new("uc", "id");
    pub const EDITOR_NAME: Column = Column::new("uc", "name");
    pub const AUTHOR_ID: Column = Column::new("ua", "id");
    pub const AUTHOR_NAME: Column = Column::new("ua", "name");
    pub const AUTHOR_USERNAME: Column = Column::new("ua", "username");
    pub const PROJECT_KEY: Column = Column::new("p", "id");
    pub const PROJECT_TITLE: Column = Column::new("p", "title");

    pub const USER_ID: Column = Column::new("u", "id");
    pub const USER_NAME: Column = Column::new("u", "name");
}

const LIST_COLUMNS: [Column; 18] = [
    cols::ID,
    cols::PROJECT_ID,
    cols::PARENT_ID,
    cols::TITLE,
    cols::ALIAS,
    cols::DESCRIPTION,
    cols::CONTEXT,
    cols::ITEM_ID,
    cols::CHECKED_OUT,
    cols::CHECKED_OUT_TIME,
    cols::STATE,
    cols::ACCESS,
    cols::CREATED,
    cols::CREATED_BY,
    cols::MODIFIED,
    cols::LFT,
    cols::RGT,
    cols::LEVEL,
];

fn not_root() -> Predicate {
    Predicate::NotEq(cols::ALIAS, Value::from(ROOT_ALIAS))
}

pub fn sort_column(column: SortColumn) -> Column {
    match column {
        SortColumn::Id => cols::ID,
        SortColumn::ProjectId => cols::PROJECT_ID,
        SortColumn::ProjectTitle => cols::PROJECT_TITLE,
        SortColumn::Title => cols::TITLE,
        SortColumn::Description => cols::DESCRIPTION,
        SortColumn::Created => cols::CREATED,
        SortColumn::CreatedBy => cols::CREATED_BY,
        SortColumn::Modified => cols::MODIFIED,
        SortColumn::ModifiedBy => cols::MODIFIED_BY,
        SortColumn::CheckedOut => cols::CHECKED_OUT,
        SortColumn::CheckedOutTime => cols::CHECKED_OUT_TIME,
        SortColumn::Access => cols::ACCESS,
        SortColumn::State => cols::STATE,
        SortColumn::Context => cols::CONTEXT,
        SortColumn::Lft => cols::LFT,
    }
}

/// Builds the filtered, access-controlled, sorted and paged list query.
pub fn build_list_query(filter: &ListFilter, access: &AccessContext) -> SelectQuery {
    let mut query = SelectQuery::select_from(COMMENTS);
    for column in LIST_COLUMNS {
        query = query.select(SelectItem::column(column));
    }
    query = query
        .select(SelectItem::aliased(Expr::Column(cols::EDITOR_NAME), "editor"))
        .select(SelectItem::aliased(Expr::Column(cols::AUTHOR_NAME), "author_name"))
        .select(SelectItem::aliased(Expr::Column(cols::PROJECT_TITLE), "project_title"))
        .join(Join::left(EDITORS, cols::EDITOR_ID, cols::CHECKED_OUT))
        .join(Join::left(AUTHORS, cols::AUTHOR_ID, cols::CREATED_BY))
        .join(Join::left(PROJECTS, cols::PROJECT_KEY, cols::PROJECT_ID))
        .filter(not_root());

    if !access.is_admin {
        let levels = access.view_levels.iter().copied().map(Value::from).collect();
        query = query.filter(Predicate::In(cols::ACCESS, levels));
    }

    if let Some(project) = filter.project.filter(|id| *id != 0) {
        query = query.filter(Predicate::Eq(cols::PROJECT_ID, Value::from(project)));
    }

    match filter.published {
        PublishedFilter::Exact(state) => {
            query = query.filter(Predicate::Eq(cols::STATE, Value::from(state)));
        }
        PublishedFilter::Default => {
            query = query.filter(Predicate::In(
                cols::STATE,
                vec![Value::from(STATE_UNPUBLISHED), Value::from(STATE_PUBLISHED)],
            ));
        }
        PublishedFilter::Any => {}
    }

    if let Some(author) = filter.author {
        let value = Value::from(author.user_id);
        query = query.filter(if author.include {
            Predicate::Eq(cols::CREATED_BY, value)
        } else {
            Predicate::NotEq(cols::CREATED_BY, value)
        });
    }

    if let Some(context) = filter.context.as_deref().filter(|context| !context.is_empty()) {
        query = query.filter(Predicate::Eq(cols::CONTEXT, Value::from(context)));
    }

    if let Some(item_id) = filter.item_id {
        query = query.filter(Predicate::Eq(cols::ITEM_ID, Value::from(item_id)));
    }

    match &filter.search {
        Some(SearchTerm::Id(id)) => {
            query = query.filter(Predicate::Eq(cols::ID, Value::from(*id)));
        }
        Some(SearchTerm::Author(name)) => {
            query = query.filter(Predicate::ContainsAny(
                vec![cols::AUTHOR_NAME, cols::AUTHOR_USERNAME],
                name.clone(),
            ));
        }
        Some(SearchTerm::Text(text)) => {
            query = query.filter(Predicate::ContainsAny(
                vec![cols::TITLE, cols::ALIAS],
                text.clone(),
            ));
        }
        None => {}
    }

    let primary = sort_column(filter.ordering.column);
    query = query.order(OrderTerm::new(Expr::Column(primary), filter.ordering.direction));
    if primary != cols::LFT {
        query = query.order(OrderTerm::asc(Expr::Column(cols::LFT)));
    }

    // One row per comment. The joined display columns ride along in the
    // group because PostgreSQL only infers dependence on the grouped key.
    query = query
        .group(cols::ID)
        .group(cols::EDITOR_NAME)
        .group(cols::AUTHOR_NAME)
        .group(cols::PROJECT_TITLE);

    let limit = (filter.page.limit > 0).then(|| i64::from(filter.page.limit));
    query.page(limit, i64::from(filter.page.start))
}

/// Distinct comment authors for the author dropdown. `None` when no project
/// is selected: the dropdown stays empty until one is.
pub fn build_authors_query(project: Option<i64>, scope: AuthorScope) -> Option<SelectQuery> {
    let project = project.filter(|id| *id != 0)?;

    let mut query = SelectQuery::select_from(USERS)
        .select(SelectItem::aliased(Expr::Column(cols::USER_ID), "value"))
        .select(SelectItem::aliased(Expr::Column(cols::USER_NAME), "text"))
        .join(Join::inner(COMMENTS, cols::CREATED_BY, cols::USER_ID));

    if scope == AuthorScope::SelectedProject {
        query = query.filter(Predicate::Eq(cols::PROJECT_ID, Value::from(project)));
    }

    Some(
        query
            .group(cols::USER_ID)
            .group(cols::USER_NAME)
            .order(OrderTerm::asc(Expr::Column(cols::USER_NAME))),
    )
}

/// Every context in use by a real comment, ascending.
pub fn build_contexts_query() -> SelectQuery {
    SelectQuery::select_from(COMMENTS)
        .distinct()
        .select(SelectItem::column(cols::CONTEXT))
        .filter(not_root())
        .order(OrderTerm::asc(Expr::Column(cols::CONTEXT)))
}

/// Items referenced by comments under one context of one project. `None` when
/// either is missing.
pub fn build_context_items_query(context: Option<&str>, project: Option<i64>) -> Option<SelectQuery> {
    let context = context.filter(|context| !context.is_empty())?;
    let project = project.filter(|id| *id != 0)?;

    Some(
        SelectQuery::select_from(COMMENTS)
            .select(SelectItem::aliased(Expr::Column(cols::ITEM_ID), "value"))
            .select(SelectItem::aliased(Expr::Min(cols::TITLE), "text"))
            .filter(Predicate::Eq(cols::CONTEXT, Value::from(context)))
            .filter(Predicate::Eq(cols::PROJECT_ID, Value::from(project)))
            .filter(not_root())
            .group(cols::ITEM_ID)
            .order(OrderTerm::asc(Expr::Min(cols::TITLE))),
    )
}

/// Translation key for a context label: `tasks.task` becomes `TASKS_TASK_TITLE`.
pub fn context_label_key(context: &str) -> String {
    format!("{}_TITLE", context.to_uppercase().replace('.', "_"))
}
