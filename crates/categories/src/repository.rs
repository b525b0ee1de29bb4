use crate::models::Category;
use common::Kind;
use database::{self, RepositoryError};
use sqlx::FromRow;

#[derive(FromRow)]
struct CategoryRecord {
    id: i64,
    name: String,
    kind: String,
    parent_id: Option<i64>,
    bg_color: Option<String>,
    children_bg_color: Option<String>,
}

impl TryFrom<CategoryRecord> for Category {
    type Error = RepositoryError;

    fn try_from(record: CategoryRecord) -> Result<Self, Self::Error> {
        let kind = record.kind.parse::<Kind>().map_err(RepositoryError::InvalidData)?;
        Ok(Category {
            id: record.id,
            name: record.name,
            kind,
            parent_id: record.parent_id,
            bg_color: record.bg_color,
            children_bg_color: record.children_bg_color,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, name, kind, parent_id, bg_color, children_bg_color FROM categories";

pub(crate) struct NewCategoryRow<'r> {
    pub name: &'r str,
    pub kind: Kind,
    pub parent_id: Option<i64>,
    pub bg_color: Option<&'r str>,
    pub children_bg_color: Option<&'r str>,
}

pub(crate) struct CategoryRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, row: &NewCategoryRow<'_>) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (name, kind, parent_id, bg_color, children_bg_color) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(row.name)
        .bind(row.kind.as_str())
        .bind(row.parent_id)
        .bind(row.bg_color)
        .bind(row.children_bg_color)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn list_by_kind(&mut self, kind: Kind) -> Result<Vec<Category>, RepositoryError> {
        let records = sqlx::query_as::<_, CategoryRecord>(&format!(
            "{} WHERE kind = $1 ORDER BY name COLLATE NOCASE, id",
            SELECT_COLUMNS
        ))
        .bind(kind.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        records.into_iter().map(Category::try_from).collect()
    }

    pub async fn find_by_id(&mut self, id: i64, kind: Kind) -> Result<Option<Category>, RepositoryError> {
        let record = sqlx::query_as::<_, CategoryRecord>(&format!(
            "{} WHERE id = $1 AND kind = $2",
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(kind.as_str())
        .fetch_optional(&mut *self.conn)
        .await?;

        record.map(Category::try_from).transpose()
    }

    /// Looks up a top-level category of `kind` by exact name.
    pub async fn find_parent_by_name(&mut self, kind: Kind, name: &str) -> Result<Option<Category>, RepositoryError> {
        let record = sqlx::query_as::<_, CategoryRecord>(&format!(
            "{} WHERE kind = $1 AND parent_id IS NULL AND name = $2 ORDER BY id LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(kind.as_str())
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        record.map(Category::try_from).transpose()
    }

    pub async fn find_child_by_name(&mut self, parent_id: i64, name: &str) -> Result<Option<Category>, RepositoryError> {
        let record = sqlx::query_as::<_, CategoryRecord>(&format!(
            "{} WHERE parent_id = $1 AND name = $2 ORDER BY id LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(parent_id)
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        record.map(Category::try_from).transpose()
    }

    pub async fn count_children(&mut self, parent_id: i64) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
            .bind(parent_id)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    pub async fn set_children_bg_color(&mut self, id: i64, color: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE categories SET children_bg_color = $1 WHERE id = $2")
            .bind(color)
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Absent fields keep their stored value.
    pub async fn update(
        &mut self,
        id: i64,
        name: Option<&str>,
        bg_color: Option<&str>,
        children_bg_color: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE categories SET name = COALESCE($1, name), bg_color = COALESCE($2, bg_color), children_bg_color = COALESCE($3, children_bg_color) WHERE id = $4",
        )
        .bind(name)
        .bind(bg_color)
        .bind(children_bg_color)
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Overwrites every child's background color.
    pub async fn recolor_children(&mut self, parent_id: i64, color: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("UPDATE categories SET bg_color = $1 WHERE parent_id = $2")
            .bind(color)
            .bind(parent_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_transactions(&mut self, category_id: i64) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    pub async fn count_child_transactions(&mut self, parent_id: i64) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE category_id IN (SELECT id FROM categories WHERE parent_id = $1)",
        )
        .bind(parent_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(count)
    }

    pub async fn delete_children(&mut self, parent_id: i64) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE parent_id = $1")
            .bind(parent_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::get_test_db;

    fn parent_row(name: &str) -> NewCategoryRow<'_> {
        NewCategoryRow {
            name,
            kind: Kind::Expense,
            parent_id: None,
            bg_color: Some("#111111"),
            children_bg_color: Some("#222222"),
        }
    }

    fn child_row(name: &str, parent_id: i64) -> NewCategoryRow<'_> {
        NewCategoryRow {
            name,
            kind: Kind::Expense,
            parent_id: Some(parent_id),
            bg_color: Some("#222222"),
            children_bg_color: None,
        }
    }

    #[tokio::test]
    async fn test_create_category() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&parent_row("Test Category")).await.unwrap();
        assert!(id > 0);

        let cat = repo.find_by_id(id, Kind::Expense).await.unwrap().unwrap();
        assert_eq!(cat.name, "Test Category");
        assert_eq!(cat.kind, Kind::Expense);
        assert_eq!(cat.bg_color.as_deref(), Some("#111111"));
        assert_eq!(cat.children_bg_color.as_deref(), Some("#222222"));
        assert!(cat.is_parent());
    }

    #[tokio::test]
    async fn test_find_by_id_respects_kind() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&parent_row("Groceries")).await.unwrap();
        assert!(repo.find_by_id(id, Kind::Income).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_kind_sorted_by_name() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        repo.create(&parent_row("Zoo")).await.unwrap();
        repo.create(&parent_row("apples")).await.unwrap();
        repo.create(&NewCategoryRow { kind: Kind::Income, ..parent_row("Salary") }).await.unwrap();

        let names: Vec<String> = repo.list_by_kind(Kind::Expense).await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["apples", "Zoo"]);
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&parent_row("Original")).await.unwrap();
        repo.update(id, Some("Updated"), None, Some("#333333")).await.unwrap();

        let cat = repo.find_by_id(id, Kind::Expense).await.unwrap().unwrap();
        assert_eq!(cat.name, "Updated");
        assert_eq!(cat.bg_color.as_deref(), Some("#111111"));
        assert_eq!(cat.children_bg_color.as_deref(), Some("#333333"));

        let missing = repo.update(9999, Some("x"), None, None).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_recolor_children() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let parent = repo.create(&parent_row("Home")).await.unwrap();
        let a = repo.create(&child_row("Rent", parent)).await.unwrap();
        repo.create(&child_row("Power", parent)).await.unwrap();

        assert_eq!(repo.recolor_children(parent, "#abcdef").await.unwrap(), 2);
        let child = repo.find_by_id(a, Kind::Expense).await.unwrap().unwrap();
        assert_eq!(child.bg_color.as_deref(), Some("#abcdef"));
        assert_eq!(repo.count_children(parent).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_transaction_counts() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let parent = repo.create(&parent_row("Car")).await.unwrap();
        let child = repo.create(&child_row("Fuel", parent)).await.unwrap();

        sqlx::query("INSERT INTO transactions (date, amount, category_id, kind) VALUES ('2024-03-01', '10.00', $1, 'EXPENSE')")
            .bind(child)
            .execute(uow.connection())
            .await
            .unwrap();

        let mut repo = CategoryRepository::new(uow.connection());
        assert_eq!(repo.count_transactions(parent).await.unwrap(), 0);
        assert_eq!(repo.count_transactions(child).await.unwrap(), 1);
        assert_eq!(repo.count_child_transactions(parent).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_children_then_parent() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let parent = repo.create(&parent_row("Delete Me")).await.unwrap();
        repo.create(&child_row("Child", parent)).await.unwrap();

        assert_eq!(repo.delete_children(parent).await.unwrap(), 1);
        repo.delete(parent).await.unwrap();
        assert!(repo.find_by_id(parent, Kind::Expense).await.unwrap().is_none());
        assert!(matches!(repo.delete(parent).await, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = CategoryRepository::new(uow.connection());

        let parent = repo.create(&parent_row("Health")).await.unwrap();
        let child = repo.create(&child_row("Pharmacy", parent)).await.unwrap();

        assert_eq!(repo.find_parent_by_name(Kind::Expense, "Health").await.unwrap().map(|c| c.id), Some(parent));
        assert!(repo.find_parent_by_name(Kind::Income, "Health").await.unwrap().is_none());
        assert!(repo.find_parent_by_name(Kind::Expense, "Pharmacy").await.unwrap().is_none());
        assert_eq!(repo.find_child_by_name(parent, "Pharmacy").await.unwrap().map(|c| c.id), Some(child));
    }
}
