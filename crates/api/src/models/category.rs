//! Category domain types and tree assembly.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercata_core::{CategoryId, Slug};

/// A catalog category (domain type).
///
/// Categories form a tree via `parent_id`. Deactivating a category cascades
/// to all of its descendants (see `CategoryRepository::deactivate_cascade`).
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub parent_id: Option<CategoryId>,
    pub active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with its children, for tree-shaped listings.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTreeNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryTreeNode>,
}

/// Assemble a flat category list into a forest of root nodes.
///
/// Children are attached under their parent; categories whose parent is not
/// present in the input (deleted or filtered out) surface as roots rather
/// than being dropped. Sibling order follows `sort_order`, then name.
#[must_use]
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryTreeNode> {
    use std::collections::HashMap;

    let known: std::collections::HashSet<CategoryId> =
        categories.iter().map(|c| c.id).collect();

    let mut by_parent: HashMap<Option<CategoryId>, Vec<Category>> = HashMap::new();
    for category in categories {
        let parent = category.parent_id.filter(|p| known.contains(p));
        by_parent.entry(parent).or_default().push(category);
    }

    fn attach(
        parent: Option<CategoryId>,
        by_parent: &mut std::collections::HashMap<Option<CategoryId>, Vec<Category>>,
    ) -> Vec<CategoryTreeNode> {
        let Some(mut children) = by_parent.remove(&parent) else {
            return Vec::new();
        };
        children.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        children
            .into_iter()
            .map(|category| {
                let id = category.id;
                CategoryTreeNode {
                    category,
                    children: attach(Some(id), by_parent),
                }
            })
            .collect()
    }

    attach(None, &mut by_parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i32, parent: Option<i32>, name: &str, sort_order: i32) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            slug: Slug::generate(name),
            description: String::new(),
            parent_id: parent.map(CategoryId::new),
            active: true,
            sort_order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_tree_three_levels() {
        let flat = vec![
            category(1, None, "Drinks", 0),
            category(2, Some(1), "Coffee", 0),
            category(3, Some(2), "Espresso", 0),
            category(4, Some(1), "Tea", 1),
        ];

        let tree = build_tree(flat);
        assert_eq!(tree.len(), 1);
        let drinks = tree.first().expect("root");
        assert_eq!(drinks.children.len(), 2);
        let coffee = drinks.children.first().expect("coffee");
        assert_eq!(coffee.category.name, "Coffee");
        assert_eq!(coffee.children.len(), 1);
        assert_eq!(coffee.children[0].category.name, "Espresso");
    }

    #[test]
    fn test_build_tree_orphan_becomes_root() {
        // Parent 99 is not in the list (e.g., filtered out as inactive)
        let flat = vec![category(1, None, "A", 0), category(2, Some(99), "B", 0)];

        let tree = build_tree(flat);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_build_tree_sibling_order() {
        let flat = vec![
            category(1, None, "Zeta", 0),
            category(2, None, "Alpha", 0),
            category(3, None, "First", -1),
        ];

        let tree = build_tree(flat);
        let names: Vec<&str> = tree.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(names, ["First", "Alpha", "Zeta"]);
    }
}
