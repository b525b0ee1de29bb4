use crate::models::{
    delete_blocked_message, Category, CategoryListing, CategoryNode, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::repository::{CategoryRepository, NewCategoryRow};
use common::validation::non_empty;
use common::Kind;
use database::{Database, RepositoryError};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    DomainRule(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Category not found")]
    NotFound,
    #[error("Parent category not found")]
    ParentNotFound,
    #[error("Unknown category kind: {0}")]
    UnknownKind(String),
}

impl From<RepositoryError> for CategoryError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => CategoryError::NotFound,
            RepositoryError::CheckViolation(msg) => CategoryError::InvalidInput(msg),
            RepositoryError::Infrastructure(e) => CategoryError::Infrastructure(e.to_string()),
            _ => CategoryError::Infrastructure(err.to_string()),
        }
    }
}

pub struct CategoryService;

impl CategoryService {
    #[instrument(skip(db))]
    pub async fn list_categories(db: &Database, kind: Kind, as_tree: bool) -> Result<CategoryListing, CategoryError> {
        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        let categories = repo.list_by_kind(kind).await?;

        if as_tree {
            Ok(CategoryListing::Tree(build_tree(categories)))
        } else {
            Ok(CategoryListing::Flat(categories))
        }
    }

    #[instrument(skip(db))]
    pub async fn get_category(db: &Database, id: i64, kind: Kind) -> Result<Category, CategoryError> {
        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        let category = repo.find_by_id(id, kind).await?
            .ok_or(CategoryError::NotFound)?;

        Ok(category)
    }

    /// Creates a parent, or a child under an existing parent of the same kind.
    ///
    /// The first child of a parent without a default subcategory color
    /// establishes that default; the parent update and the child insert
    /// commit together.
    #[instrument(skip(db))]
    pub async fn create_category(
        db: &Database,
        kind: Kind,
        req: CreateCategoryRequest,
    ) -> Result<Category, CategoryError> {
        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        let id = match &req {
            CreateCategoryRequest::Parent { name, bg_color, children_bg_color } => {
                repo.create(&NewCategoryRow {
                    name: name.as_str(),
                    kind,
                    parent_id: None,
                    bg_color: Some(bg_color.as_str()),
                    children_bg_color: Some(children_bg_color.as_str()),
                })
                .await?
            }
            CreateCategoryRequest::Child { name, parent_id, first_child_color } => {
                let parent = repo.find_by_id(*parent_id, kind).await?
                    .filter(Category::is_parent)
                    .ok_or(CategoryError::ParentNotFound)?;

                let color = match parent.children_bg_color {
                    Some(color) => color,
                    None => {
                        if repo.count_children(parent.id).await? > 0 {
                            return Err(CategoryError::DomainRule(
                                "Parent has no childrenBgColor configured".into(),
                            ));
                        }
                        let color = first_child_color.clone().ok_or_else(|| {
                            CategoryError::InvalidInput(
                                "childrenBgColor is required for the first subcategory of this parent".into(),
                            )
                        })?;
                        repo.set_children_bg_color(parent.id, &color).await?;
                        tracing::info!(parent_id = parent.id, %color, "Established default subcategory color");
                        color
                    }
                };

                repo.create(&NewCategoryRow {
                    name: name.as_str(),
                    kind,
                    parent_id: Some(parent.id),
                    bg_color: Some(color.as_str()),
                    children_bg_color: None,
                })
                .await?
            }
        };

        let category = repo.find_by_id(id, kind).await?
            .ok_or(CategoryError::NotFound)?;

        uow.commit().await?;

        Ok(category)
    }

    /// Renames/recolors a category. A new `childrenBgColor` on a parent is
    /// pushed down to every child's background color.
    #[instrument(skip(db))]
    pub async fn update_category(
        db: &Database,
        kind: Kind,
        req: UpdateCategoryRequest,
    ) -> Result<Category, CategoryError> {
        let name = non_empty(req.name);
        let bg_color = non_empty(req.bg_color);
        let children_bg_color = non_empty(req.children_bg_color);

        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        let category = repo.find_by_id(req.id, kind).await?
            .ok_or(CategoryError::NotFound)?;

        if category.is_parent() {
            repo.update(category.id, name.as_deref(), bg_color.as_deref(), children_bg_color.as_deref()).await?;
            if let Some(color) = &children_bg_color {
                let recolored = repo.recolor_children(category.id, color).await?;
                tracing::debug!(parent_id = category.id, recolored, "Propagated subcategory color");
            }
        } else {
            repo.update(category.id, name.as_deref(), bg_color.as_deref(), None).await?;
        }

        let updated = repo.find_by_id(category.id, kind).await?
            .ok_or(CategoryError::NotFound)?;

        uow.commit().await?;
        Ok(updated)
    }

    /// Deletes a category; a parent takes its children with it. Refused
    /// while the category, or any child of it, is referenced by a transaction.
    #[instrument(skip(db))]
    pub async fn delete_category(
        db: &Database,
        kind: Kind,
        id: i64,
    ) -> Result<(), CategoryError> {
        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        let category = repo.find_by_id(id, kind).await?
            .ok_or(CategoryError::NotFound)?;

        if repo.count_transactions(category.id).await? > 0 {
            tracing::info!(category_id = id, "Delete blocked by transactions");
            return Err(CategoryError::DomainRule(delete_blocked_message(kind, false).into()));
        }

        if category.is_parent() {
            if repo.count_child_transactions(category.id).await? > 0 {
                tracing::info!(category_id = id, "Delete blocked by subcategory transactions");
                return Err(CategoryError::DomainRule(delete_blocked_message(kind, true).into()));
            }
            repo.delete_children(category.id).await?;
        }

        repo.delete(category.id).await?;

        uow.commit().await?;
        Ok(())
    }
}

/// Groups a name-sorted flat list into parents with nested children.
/// Relative order is preserved at both levels.
pub(crate) fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let (parents, children): (Vec<Category>, Vec<Category>) =
        categories.into_iter().partition(Category::is_parent);

    let mut nodes: Vec<CategoryNode> = parents
        .into_iter()
        .map(|category| CategoryNode { category, children: Vec::new() })
        .collect();

    for child in children {
        if let Some(node) = nodes.iter_mut().find(|n| Some(n.category.id) == child.parent_id) {
            node.children.push(child);
        }
    }

    nodes
}
