use std::path::PathBuf;
use std::sync::Arc;

use folio_core::loader::{Fetched, Handle, HandleRegistry};

fn bytes(n: u8) -> Arc<[u8]> {
    vec![n; 16].into()
}

#[test]
fn test_double_release_is_harmless() {
    let mut registry = HandleRegistry::new();
    let a = registry.allocate(bytes(1), None);
    let b = registry.allocate(bytes(2), Some("image/png".into()));

    assert!(registry.release(&a));
    assert!(!registry.release(&a));

    assert!(registry.is_live(&b));
    assert_eq!(registry.dereference(&b).unwrap()[0], 2);
    assert_eq!(registry.live_count(), 1);
    assert_eq!(registry.released_total(), 1);
}

#[test]
fn test_released_handle_no_longer_dereferences() {
    let mut registry = HandleRegistry::new();
    let a = registry.allocate(bytes(7), None);
    registry.release(&a);
    assert!(registry.dereference(&a).is_none());
}

#[test]
fn test_non_revocable_release_is_noop() {
    let mut registry = HandleRegistry::new();
    let remote = Handle::Remote("https://cdn.example/a.png".into());
    let local = Handle::Local(PathBuf::from("/tmp/a.png"));
    assert!(!registry.release(&remote));
    assert!(!registry.release(&local));
    assert_eq!(registry.released_total(), 0);
}

#[test]
fn test_handle_ids_are_unique() {
    let mut registry = HandleRegistry::new();
    let a = registry.allocate(bytes(1), None);
    registry.release(&a);
    let b = registry.allocate(bytes(1), None);
    assert_ne!(a.uri(), b.uri());
    assert!(!registry.is_live(&a));
    assert!(registry.is_live(&b));
}

#[test]
fn test_materialize_allocates_for_inline_only() {
    let mut registry = HandleRegistry::new();
    let inline = registry.materialize(Fetched::Inline {
        bytes: bytes(3),
        content_type: Some("application/pdf".into()),
    });
    let local = registry.materialize(Fetched::Local(PathBuf::from("/tmp/b.pdf")));

    assert_eq!(inline.content_type(), Some("application/pdf"));
    assert!(inline.is_revocable());
    assert!(!local.is_revocable());
    assert_eq!(registry.allocated_total(), 1);
}

#[test]
fn test_release_all_counts_everything_once() {
    let mut registry = HandleRegistry::new();
    let a = registry.allocate(bytes(1), None);
    registry.allocate(bytes(2), None);
    registry.release(&a);

    assert_eq!(registry.release_all(), 1);
    assert_eq!(registry.release_all(), 0);
    assert_eq!(registry.released_total(), 2);
    assert_eq!(registry.allocated_total(), 2);
}
