// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! Folder-tree synthesis from the provider's flat listing

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::drive::{DriveService, FolderRecord};
use crate::{Result, TidyDriveError};

/// Synthetic root id; the provider never assigns it to a real folder
pub const ROOT_ID: &str = "root";

/// Display name of the synthetic root
pub const ROOT_NAME: &str = "My Drive";

/// One node of the reconstructed hierarchy
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub children: Vec<FolderNode>,
}

/// Fetch the complete folder listing and reconstruct the hierarchy.
///
/// The returned tree is built fresh per call and never cached.
pub async fn build_tree(drive: &dyn DriveService, max_pages: u32) -> Result<FolderNode> {
    let records = list_all_folders(drive, max_pages).await?;
    debug!("Building tree from {} folder records", records.len());
    Ok(assemble_tree(&records))
}

/// Accumulate every page of the folder listing into one flat sequence.
///
/// The loop ends when the provider stops returning a continuation
/// token; `max_pages` guards against a provider that never does.
pub async fn list_all_folders(
    drive: &dyn DriveService,
    max_pages: u32,
) -> Result<Vec<FolderRecord>> {
    let mut records = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let page = drive.list_folders(page_token.as_deref()).await?;
        records.extend(page.records);

        pages += 1;
        match page.next_page_token {
            Some(token) => {
                if pages >= max_pages {
                    return Err(TidyDriveError::Listing(format!(
                        "Folder listing exceeded {} pages",
                        max_pages
                    )));
                }
                page_token = Some(token);
            }
            None => break,
        }
    }

    Ok(records)
}

/// Build the rooted hierarchy from a flat listing.
///
/// Only the first declared parent of a record counts. A record whose
/// parent id is absent from the listing becomes a root child, as does
/// any record whose parent chain loops back on itself. Children are
/// sorted by name at every level; ties keep their listing order.
pub fn assemble_tree(records: &[FolderRecord]) -> FolderNode {
    let ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();

    let declared: HashMap<&str, Option<&str>> = records
        .iter()
        .map(|r| {
            let parent = r
                .parent_id()
                .filter(|p| ids.contains(p) && *p != r.id.as_str());
            (r.id.as_str(), parent)
        })
        .collect();

    let mut children_by_parent: HashMap<&str, Vec<&FolderRecord>> = HashMap::new();
    for record in records {
        let mut parent = declared[record.id.as_str()];

        // Walk the parent chain; a chain that revisits this record can
        // never reach the root, so break it here.
        let mut cursor = parent;
        let mut hops = 0usize;
        while let Some(p) = cursor {
            hops += 1;
            if p == record.id || hops > records.len() {
                parent = None;
                break;
            }
            cursor = declared[p];
        }

        children_by_parent
            .entry(parent.unwrap_or(ROOT_ID))
            .or_default()
            .push(record);
    }

    build_node(ROOT_ID, ROOT_NAME, &children_by_parent)
}

fn build_node(
    id: &str,
    name: &str,
    children_by_parent: &HashMap<&str, Vec<&FolderRecord>>,
) -> FolderNode {
    let mut children: Vec<FolderNode> = children_by_parent
        .get(id)
        .map(|records| {
            records
                .iter()
                .map(|r| build_node(&r.id, &r.name, children_by_parent))
                .collect()
        })
        .unwrap_or_default();

    children.sort_by(|a, b| a.name.cmp(&b.name));

    FolderNode {
        id: id.to_string(),
        name: name.to_string(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{DriveFile, FolderPage};
    use async_trait::async_trait;

    struct PagedDrive {
        pages: Vec<Vec<FolderRecord>>,
        endless_token: bool,
    }

    fn record(id: &str, name: &str, parent: Option<&str>) -> FolderRecord {
        FolderRecord {
            id: id.to_string(),
            name: name.to_string(),
            parents: parent.map(|p| vec![p.to_string()]).unwrap_or_default(),
        }
    }

    #[async_trait]
    impl DriveService for PagedDrive {
        async fn list_folders(&self, page_token: Option<&str>) -> crate::Result<FolderPage> {
            if self.endless_token {
                return Ok(FolderPage {
                    records: Vec::new(),
                    next_page_token: Some("again".to_string()),
                });
            }
            let index: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
            let next = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
            Ok(FolderPage {
                records: self.pages[index].clone(),
                next_page_token: next,
            })
        }

        async fn create_file(&self, _: &str, _: &str, _: Vec<u8>) -> crate::Result<DriveFile> {
            unreachable!()
        }
        async fn create_folder(&self, _: &str, _: Option<&str>) -> crate::Result<DriveFile> {
            unreachable!()
        }
        async fn move_file(&self, _: &str, _: &str, _: &[String]) -> crate::Result<DriveFile> {
            unreachable!()
        }
        async fn get_file(&self, _: &str) -> crate::Result<DriveFile> {
            unreachable!()
        }
        async fn search_files(&self, _: &str) -> crate::Result<Vec<DriveFile>> {
            unreachable!()
        }
        async fn latest_file(&self) -> crate::Result<Option<DriveFile>> {
            unreachable!()
        }
    }

    fn names(nodes: &[FolderNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn sorts_siblings_and_nests_children() {
        let records = vec![
            record("1", "Zeta", None),
            record("2", "Alpha", Some("1")),
            record("3", "Beta", None),
        ];
        let tree = assemble_tree(&records);

        assert_eq!(tree.id, ROOT_ID);
        assert_eq!(tree.name, ROOT_NAME);
        assert_eq!(names(&tree.children), vec!["Beta", "Zeta"]);

        let zeta = &tree.children[1];
        assert_eq!(names(&zeta.children), vec!["Alpha"]);
    }

    #[test]
    fn unknown_parent_becomes_root_child() {
        let records = vec![
            record("a", "Orphan", Some("missing")),
            record("b", "Top", None),
        ];
        let tree = assemble_tree(&records);
        assert_eq!(names(&tree.children), vec!["Orphan", "Top"]);
    }

    #[test]
    fn every_record_appears_exactly_once() {
        let records = vec![
            record("1", "A", None),
            record("2", "B", Some("1")),
            record("3", "C", Some("2")),
            record("4", "D", Some("missing")),
        ];
        let tree = assemble_tree(&records);

        fn count(node: &FolderNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        // root plus the four records
        assert_eq!(count(&tree), 5);
    }

    #[test]
    fn self_parent_is_rerooted() {
        let records = vec![record("x", "Loop", Some("x"))];
        let tree = assemble_tree(&records);
        assert_eq!(names(&tree.children), vec!["Loop"]);
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn parent_cycle_is_broken() {
        let records = vec![
            record("a", "First", Some("b")),
            record("b", "Second", Some("a")),
        ];
        let tree = assemble_tree(&records);

        fn count(node: &FolderNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        assert_eq!(count(&tree), 3);
    }

    #[test]
    fn nested_sort_is_recursive() {
        let records = vec![
            record("p", "Parent", None),
            record("c2", "Zulu", Some("p")),
            record("c1", "Echo", Some("p")),
            record("c3", "Alfa", Some("p")),
        ];
        let tree = assemble_tree(&records);
        assert_eq!(names(&tree.children[0].children), vec!["Alfa", "Echo", "Zulu"]);
    }

    #[tokio::test]
    async fn accumulates_all_pages() {
        let drive = PagedDrive {
            pages: vec![
                vec![record("1", "One", None)],
                vec![record("2", "Two", None)],
                vec![record("3", "Three", None)],
            ],
            endless_token: false,
        };
        let records = list_all_folders(&drive, 100).await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn page_order_does_not_change_tree() {
        let forward = PagedDrive {
            pages: vec![
                vec![record("1", "Zeta", None)],
                vec![record("3", "Beta", None)],
            ],
            endless_token: false,
        };
        let backward = PagedDrive {
            pages: vec![
                vec![record("3", "Beta", None)],
                vec![record("1", "Zeta", None)],
            ],
            endless_token: false,
        };
        let a = build_tree(&forward, 100).await.unwrap();
        let b = build_tree(&backward, 100).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn endless_continuation_token_hits_page_cap() {
        let drive = PagedDrive { pages: vec![], endless_token: true };
        let err = list_all_folders(&drive, 10).await.unwrap_err();
        assert!(matches!(err, TidyDriveError::Listing(_)));
    }
}
