//! Verify command implementation.

use super::{open_existing, CliError};
use std::path::Path;
use std::sync::Arc;
use todo_store::{IntegrityReport, Notebook};

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), CliError> {
    println!("Verifying store at {:?}", path);
    println!();

    let store = open_existing(path)?;
    let report = Notebook::new(Arc::new(store)).check_integrity()?;
    print_report(&report);

    println!();
    if report.is_consistent() {
        println!("✓ Store verification passed");
        Ok(())
    } else {
        println!("✗ Store verification failed");
        Err(CliError::VerificationFailed(report.violations.len()))
    }
}

fn print_report(report: &IntegrityReport) {
    println!("  Pages checked: {}", report.pages);
    println!("  Items checked: {}", report.items);
    println!("  Violations:    {}", report.violations.len());
    for violation in report.violations.iter().take(20) {
        println!("    - {violation}");
    }
    if report.violations.len() > 20 {
        println!("    ... and {} more", report.violations.len() - 20);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_store::{ItemData, Store, StoreConfig};

    #[test]
    fn consistent_store_passes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Arc::new(Store::open(StoreConfig::at(dir.path())).unwrap());
            let nb = Notebook::new(store);
            let page = nb.create_page().unwrap();
            nb.add_item_to_page(page.id, ItemData::new("x", false)).unwrap();
        }
        assert!(run(dir.path()).is_ok());
    }

    #[test]
    fn orphaned_item_fails() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Store::open(StoreConfig::at(dir.path())).unwrap();
            let page = store.create_page().unwrap();
            // Raw write that bypasses page membership.
            store
                .create_item(page.id, ItemData::new("unlisted", false))
                .unwrap();
        }
        assert!(matches!(
            run(dir.path()),
            Err(CliError::VerificationFailed(1))
        ));
    }
}
