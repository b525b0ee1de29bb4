use crate::models::SeedReport;
use crate::repository::{CategoryRepository, NewCategoryRow};
use crate::service::CategoryError;
use common::Kind;
use database::Database;
use tracing::instrument;

const PASTEL_COLORS: [&str; 20] = [
    "#FFB3BA", "#FFDFBA", "#FFFFBA", "#BAFFC9", "#BAE1FF",
    "#E2F0CB", "#FDFD96", "#FFC3A0", "#FFD1DC", "#D4F0F0",
    "#CCE2CB", "#B6CFB6", "#97C1A9", "#FCB7AF", "#FFDAC1",
    "#E7FFAC", "#FFABAB", "#D5AAFF", "#85E3FF", "#B9F6CA",
];

const DEFAULT_EXPENSE_TREE: &[(&str, &[&str])] = &[
    ("Car", &["Fuel", "Gas", "Maintenance", "Other"]),
    ("Education", &["University", "Courses", "Photocopies", "Other"]),
    ("Fixed Costs", &["Rent", "Electricity", "Gas", "Water", "WIFI", "Cable", "Phone", "Streaming", "Other"]),
    ("Groceries", &["Pantry", "Greengrocer", "Butcher", "Other"]),
    ("Health", &["Pharmacy", "Personal Care", "Emergencies", "Medical Care", "Other"]),
    ("Home", &["Furniture", "Appliances", "Repairs", "Decoration", "Other"]),
    ("Leisure", &["Holidays", "Sport", "Restaurants", "Bars", "Delivery", "Get-togethers", "Other"]),
    ("Personal", &["Online Shopping", "Other"]),
    ("Taxes", &["Municipal", "Provincial"]),
    ("Transport", &["Rideshare", "Bus", "Other"]),
];

pub struct SeedService;

impl SeedService {
    /// Inserts the default expense tree. Rows that already exist (matched by
    /// name under the same parent) are reused, so running it twice is a no-op.
    #[instrument(skip(db))]
    pub async fn seed_default_categories(db: &Database) -> Result<SeedReport, CategoryError> {
        let mut report = SeedReport::default();

        let mut uow = db.begin().await?;
        let mut repo = CategoryRepository::new(uow.connection());

        for (index, (parent_name, children)) in DEFAULT_EXPENSE_TREE.iter().enumerate() {
            let bg_color = PASTEL_COLORS[index % PASTEL_COLORS.len()];
            let children_bg_color = PASTEL_COLORS[(index + PASTEL_COLORS.len() / 2) % PASTEL_COLORS.len()];

            let parent = match repo.find_parent_by_name(Kind::Expense, parent_name).await? {
                Some(existing) => existing,
                None => {
                    let id = repo.create(&NewCategoryRow {
                        name: parent_name,
                        kind: Kind::Expense,
                        parent_id: None,
                        bg_color: Some(bg_color),
                        children_bg_color: Some(children_bg_color),
                    })
                    .await?;
                    report.parents_created += 1;
                    repo.find_by_id(id, Kind::Expense).await?
                        .ok_or(CategoryError::NotFound)?
                }
            };

            let child_color = parent.children_bg_color.as_deref().unwrap_or(children_bg_color);
            if parent.children_bg_color.is_none() {
                repo.set_children_bg_color(parent.id, child_color).await?;
            }

            for child_name in children.iter() {
                if repo.find_child_by_name(parent.id, child_name).await?.is_some() {
                    continue;
                }
                repo.create(&NewCategoryRow {
                    name: child_name,
                    kind: Kind::Expense,
                    parent_id: Some(parent.id),
                    bg_color: Some(child_color),
                    children_bg_color: None,
                })
                .await?;
                report.children_created += 1;
            }
        }

        uow.commit().await?;

        tracing::info!(
            parents = report.parents_created,
            children = report.children_created,
            "Seeded default categories"
        );
        Ok(report)
    }
}
