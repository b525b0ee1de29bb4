use common::validation::{non_empty, validate_color, validate_not_blank};
use common::Kind;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: Kind,
    pub parent_id: Option<i64>,
    pub bg_color: Option<String>,
    pub children_bg_color: Option<String>,
}

impl Category {
    pub fn is_parent(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A top-level category with its name-sorted subcategories.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CategoryListing {
    Flat(Vec<Category>),
    Tree(Vec<CategoryNode>),
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawCreateCategoryRequest {
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    pub parent_id: Option<i64>,
    #[validate(custom(function = "validate_color"))]
    pub bg_color: Option<String>,
    #[validate(custom(function = "validate_color"))]
    pub children_bg_color: Option<String>,
}

/// A validated creation request. Parents carry both colors up front;
/// children may carry the color that seeds their parent's default.
#[derive(Debug, PartialEq)]
pub enum CreateCategoryRequest {
    Parent {
        name: String,
        bg_color: String,
        children_bg_color: String,
    },
    Child {
        name: String,
        parent_id: i64,
        first_child_color: Option<String>,
    },
}

impl CreateCategoryRequest {
    pub fn new(raw: RawCreateCategoryRequest) -> Result<Self, String> {
        let name = raw.name.trim().to_string();
        if name.is_empty() {
            return Err("name is required".to_string());
        }

        let bg_color = non_empty(raw.bg_color);
        let children_bg_color = non_empty(raw.children_bg_color);

        match raw.parent_id {
            None => match (bg_color, children_bg_color) {
                (Some(bg_color), Some(children_bg_color)) => Ok(Self::Parent {
                    name,
                    bg_color,
                    children_bg_color,
                }),
                _ => Err("bgColor and childrenBgColor are required for parent categories".to_string()),
            },
            Some(parent_id) => Ok(Self::Child {
                name,
                parent_id,
                first_child_color: children_bg_color.or(bg_color),
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Parent { name, .. } | Self::Child { name, .. } => name,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub id: i64,
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_color"))]
    pub bg_color: Option<String>,
    #[validate(custom(function = "validate_color"))]
    pub children_bg_color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListCategoriesQuery {
    pub tree: Option<String>,
}

impl ListCategoriesQuery {
    pub fn as_tree(&self) -> bool {
        matches!(self.tree.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteCategoryQuery {
    pub id: i64,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct SeedReport {
    pub parents_created: usize,
    pub children_created: usize,
}

/// Messages shown when a delete is blocked by referencing transactions.
pub fn delete_blocked_message(kind: Kind, in_subcategory: bool) -> &'static str {
    match (kind, in_subcategory) {
        (Kind::Expense, false) => "Cannot delete: this category has expenses.",
        (Kind::Expense, true) => "Cannot delete: a subcategory has expenses.",
        (Kind::Income, false) => "Cannot delete: this category has transactions.",
        (Kind::Income, true) => "Cannot delete: a subcategory has transactions.",
    }
}
