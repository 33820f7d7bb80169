//! Inspect command implementation.

use super::{open_existing, CliError};
use serde::Serialize;
use std::path::Path;
use todo_store::Store;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data directory.
    pub path: String,
    /// Snapshot size in bytes.
    pub snapshot_size: u64,
    /// Number of pages.
    pub page_count: usize,
    /// Number of items.
    pub item_count: usize,
    /// Number of completed items.
    pub done_count: usize,
    /// Per-page statistics, in page creation order.
    pub pages: Vec<PageStats>,
}

/// Statistics for a single page.
#[derive(Debug, Serialize)]
pub struct PageStats {
    /// Page identifier.
    pub id: String,
    /// Number of listed items.
    pub item_count: usize,
    /// Number of listed items that are done.
    pub done_count: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), CliError> {
    let store = open_existing(path)?;
    let result = collect(path, &store)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn collect(path: &Path, store: &Store) -> Result<InspectResult, CliError> {
    let snapshot_size = store.snapshot_size()?;
    let result = store.read(|view| {
        let pages: Vec<PageStats> = view
            .pages()
            .map(|page| {
                let items: Vec<_> = page
                    .items
                    .iter()
                    .filter_map(|id| view.get_item(*id))
                    .collect();
                PageStats {
                    id: page.id.to_string(),
                    item_count: items.len(),
                    done_count: items.iter().filter(|item| item.done).count(),
                }
            })
            .collect();

        InspectResult {
            path: path.display().to_string(),
            snapshot_size,
            page_count: view.page_count(),
            item_count: view.item_count(),
            done_count: view.items().filter(|item| item.done).count(),
            pages,
        }
    })?;
    Ok(result)
}

fn print_text_output(result: &InspectResult) {
    println!("Store: {}", result.path);
    println!("Snapshot size: {} bytes", result.snapshot_size);
    println!("Pages: {}", result.page_count);
    println!("Items: {} ({} done)", result.item_count, result.done_count);

    if !result.pages.is_empty() {
        println!();
        println!("{:<26} {:>8} {:>8}", "PAGE", "ITEMS", "DONE");
        for page in &result.pages {
            println!(
                "{:<26} {:>8} {:>8}",
                page.id, page.item_count, page.done_count
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use todo_store::{ItemData, Notebook, StoreConfig};

    #[test]
    fn collects_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(StoreConfig::at(dir.path())).unwrap());
        let nb = Notebook::new(Arc::clone(&store));
        let page = nb.create_page().unwrap();
        nb.add_item_to_page(page.id, ItemData::new("a", true)).unwrap();
        nb.add_item_to_page(page.id, ItemData::new("b", false)).unwrap();
        nb.create_page().unwrap();

        let result = collect(dir.path(), &store).unwrap();
        assert_eq!(result.page_count, 2);
        assert_eq!(result.item_count, 2);
        assert_eq!(result.done_count, 1);
        assert_eq!(result.pages[0].item_count, 2);
        assert_eq!(result.pages[0].done_count, 1);
        assert_eq!(result.pages[1].item_count, 0);
        assert!(result.snapshot_size > 0);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(run(&missing, "text"), Err(CliError::NoStore(_))));
    }
}
