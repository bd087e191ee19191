//! Static folder/category reference data.
//!
//! The taxonomy is fixed configuration: every category belongs to exactly one
//! folder and there are no runtime create/update/delete operations. Folder and
//! category ids are wire-safe (they appear inside action strings and must not
//! contain the `_` separator).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Folder {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub folder_id: &'static str,
}

pub const FOLDERS: &[Folder] = &[
    Folder {
        id: "natural",
        name: "Natural Sciences",
    },
    Folder {
        id: "formal",
        name: "Formal Sciences",
    },
    Folder {
        id: "social",
        name: "Social Sciences",
    },
    Folder {
        id: "humanities",
        name: "Humanities",
    },
];

pub const CATEGORIES: &[Category] = &[
    Category {
        id: "medical",
        name: "Medicine",
        folder_id: "natural",
    },
    Category {
        id: "biology",
        name: "Biology",
        folder_id: "natural",
    },
    Category {
        id: "chemistry",
        name: "Chemistry",
        folder_id: "natural",
    },
    Category {
        id: "physics",
        name: "Physics",
        folder_id: "natural",
    },
    Category {
        id: "mathematics",
        name: "Mathematics",
        folder_id: "formal",
    },
    Category {
        id: "computing",
        name: "Computer Science",
        folder_id: "formal",
    },
    Category {
        id: "economics",
        name: "Economics",
        folder_id: "social",
    },
    Category {
        id: "law",
        name: "Law",
        folder_id: "social",
    },
    Category {
        id: "history",
        name: "History",
        folder_id: "humanities",
    },
    Category {
        id: "literature",
        name: "Literature",
        folder_id: "humanities",
    },
];

pub fn folder_by_id(id: &str) -> Option<&'static Folder> {
    FOLDERS.iter().find(|f| f.id == id)
}

pub fn category_by_id(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// Categories belonging to the given folder, in declaration order.
pub fn categories_in(folder_id: &str) -> Vec<&'static Category> {
    CATEGORIES
        .iter()
        .filter(|c| c.folder_id == folder_id)
        .collect()
}

/// Whether `category_id` exists and belongs to `folder_id`.
pub fn category_belongs_to(category_id: &str, folder_id: &str) -> bool {
    category_by_id(category_id).is_some_and(|c| c.folder_id == folder_id)
}
