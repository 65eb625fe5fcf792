//! Tests for StorageManager
//!
//! These tests verify:
//! - Listings filtered by entry kind
//! - Collision-free upload naming
//! - Typed errors for missing, mistyped and non-empty targets
//! - Move, rename and delete semantics

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use filewire::storage::{base_name, copy_name, fill_new, StorageManager};
use filewire::FileWireError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn create_storage() -> (StorageManager, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let storage = StorageManager::open(temp_dir.path()).unwrap();
    (storage, temp_dir)
}

fn write(root: &Path, name: &str, content: &[u8]) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Writer that accepts `capacity` bytes, then fails like a full disk
struct FullDisk {
    written: Vec<u8>,
    capacity: usize,
}

impl Write for FullDisk {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.capacity - self.written.len();
        if room == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
        }
        let n = buf.len().min(room);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Naming Tests
// =============================================================================

#[test]
fn test_copy_name_sequence() {
    assert_eq!(copy_name("report.txt", 0), "report.txt");
    assert_eq!(copy_name("report.txt", 1), "report-copia.txt");
    assert_eq!(copy_name("report.txt", 2), "report-copia1.txt");
    assert_eq!(copy_name("report.txt", 11), "report-copia10.txt");
}

#[test]
fn test_copy_name_uses_last_extension() {
    assert_eq!(copy_name("backup.tar.gz", 1), "backup.tar-copia.gz");
}

#[test]
fn test_copy_name_without_extension() {
    assert_eq!(copy_name("Makefile", 1), "Makefile-copia");
    assert_eq!(copy_name(".profile", 2), ".profile-copia1");
}

#[test]
fn test_base_name() {
    assert_eq!(base_name("a/b/c.txt").unwrap(), "c.txt");
    assert_eq!(base_name("c.txt").unwrap(), "c.txt");
    assert!(matches!(base_name(".."), Err(FileWireError::InvalidName(_))));
    assert!(matches!(base_name(""), Err(FileWireError::InvalidName(_))));
}

// =============================================================================
// Listing Tests
// =============================================================================

#[test]
fn test_list_files_excludes_directories() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "b.txt", b"b");
    write(temp_dir.path(), "a.txt", b"a");
    fs::create_dir(temp_dir.path().join("sub")).unwrap();

    assert_eq!(storage.list_files(".").unwrap(), vec!["a.txt", "b.txt"]);
}

#[test]
fn test_list_dirs_excludes_files() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "a.txt", b"a");
    fs::create_dir(temp_dir.path().join("zeta")).unwrap();
    fs::create_dir(temp_dir.path().join("alpha")).unwrap();

    assert_eq!(storage.list_dirs(".").unwrap(), vec!["alpha", "zeta"]);
}

#[test]
fn test_list_files_of_subdirectory() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "docs/x.md", b"x");

    assert_eq!(storage.list_files("docs").unwrap(), vec!["x.md"]);
    assert!(storage.list_files(".").unwrap().is_empty());
}

#[test]
fn test_list_missing_path() {
    let (storage, _temp_dir) = create_storage();

    assert!(matches!(
        storage.list_files("nowhere"),
        Err(FileWireError::NotFound(_))
    ));
    assert!(matches!(
        storage.list_dirs("nowhere"),
        Err(FileWireError::NotFound(_))
    ));
}

#[test]
fn test_list_dirs_on_file() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "a.txt", b"a");

    assert!(matches!(
        storage.list_dirs("a.txt"),
        Err(FileWireError::NotADirectory(_))
    ));
}

// =============================================================================
// File Tests
// =============================================================================

#[test]
fn test_read_file() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "data.bin", &[0, 1, 2, 255]);

    assert_eq!(&storage.read_file("data.bin").unwrap()[..], &[0, 1, 2, 255]);
}

#[test]
fn test_read_file_errors() {
    let (storage, temp_dir) = create_storage();
    fs::create_dir(temp_dir.path().join("dir")).unwrap();

    assert!(matches!(
        storage.read_file("missing"),
        Err(FileWireError::NotFound(_))
    ));
    assert!(matches!(
        storage.read_file("dir"),
        Err(FileWireError::NotAFile(_))
    ));
}

#[test]
fn test_store_upload_never_overwrites() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "notes.txt", b"original");

    let first = storage.store_upload("notes.txt", b"one").unwrap();
    let second = storage.store_upload("notes.txt", b"two").unwrap();

    assert_eq!(first, "notes-copia.txt");
    assert_eq!(second, "notes-copia1.txt");
    assert_eq!(fs::read(temp_dir.path().join("notes.txt")).unwrap(), b"original");
    assert_eq!(fs::read(temp_dir.path().join("notes-copia.txt")).unwrap(), b"one");
    assert_eq!(fs::read(temp_dir.path().join("notes-copia1.txt")).unwrap(), b"two");
}

#[test]
fn test_store_upload_strips_directories() {
    let (storage, temp_dir) = create_storage();

    let stored = storage.store_upload("some/client/path/photo.jpg", b"jpg").unwrap();

    assert_eq!(stored, "photo.jpg");
    assert!(temp_dir.path().join("photo.jpg").is_file());
    assert!(!temp_dir.path().join("some").exists());
}

#[test]
fn test_store_upload_empty_payload() {
    let (storage, temp_dir) = create_storage();

    storage.store_upload("empty.txt", b"").unwrap();
    assert_eq!(fs::metadata(temp_dir.path().join("empty.txt")).unwrap().len(), 0);
}

#[test]
fn test_failed_upload_write_leaves_no_file() {
    let (storage, temp_dir) = create_storage();
    let target = temp_dir.path().join("video.mp4");
    fs::write(&target, b"").unwrap();

    let mut disk = FullDisk {
        written: Vec::new(),
        capacity: 4,
    };
    let result = fill_new(&mut disk, &target, b"0123456789");

    assert!(result.is_err());
    assert_eq!(disk.written, b"0123");
    assert!(!target.exists());

    // The name is free again for the next upload
    assert_eq!(storage.store_upload("video.mp4", b"ok").unwrap(), "video.mp4");
}

#[test]
fn test_fill_new_keeps_file_on_success() {
    let (_storage, temp_dir) = create_storage();
    let target = temp_dir.path().join("ok.bin");
    let mut file = fs::File::create(&target).unwrap();

    fill_new(&mut file, &target, b"payload").unwrap();
    drop(file);

    assert_eq!(fs::read(&target).unwrap(), b"payload");
}

#[test]
fn test_delete_file() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "gone.txt", b"x");

    storage.delete_file("gone.txt").unwrap();
    assert!(!temp_dir.path().join("gone.txt").exists());
    assert!(storage.delete_file("gone.txt").is_err());
}

#[test]
fn test_rename_file() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "a.txt", b"content");

    storage.rename_file("a.txt", "b.txt").unwrap();

    assert!(!temp_dir.path().join("a.txt").exists());
    assert_eq!(fs::read(temp_dir.path().join("b.txt")).unwrap(), b"content");
}

#[test]
fn test_rename_requires_regular_file() {
    let (storage, temp_dir) = create_storage();
    fs::create_dir(temp_dir.path().join("dir")).unwrap();

    assert!(matches!(
        storage.rename_file("dir", "other"),
        Err(FileWireError::NotAFile(_))
    ));
    assert!(matches!(
        storage.rename_file("missing.txt", "other"),
        Err(FileWireError::NotAFile(_))
    ));
    assert!(temp_dir.path().join("dir").is_dir());
}

#[test]
fn test_move_file_creates_destination() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "report.pdf", b"pdf");

    let moved = storage.move_file("report.pdf", "archive/2024").unwrap();

    assert_eq!(moved, "report.pdf");
    assert!(!temp_dir.path().join("report.pdf").exists());
    assert_eq!(
        fs::read(temp_dir.path().join("archive/2024/report.pdf")).unwrap(),
        b"pdf"
    );
}

#[test]
fn test_move_file_onto_itself_keeps_content() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "stay.txt", b"keep me");

    storage.move_file("stay.txt", ".").unwrap();
    assert_eq!(fs::read(temp_dir.path().join("stay.txt")).unwrap(), b"keep me");
}

#[test]
fn test_move_missing_file() {
    let (storage, temp_dir) = create_storage();

    assert!(matches!(
        storage.move_file("missing.txt", "dest"),
        Err(FileWireError::NotFound(_))
    ));
    assert!(!temp_dir.path().join("dest").exists());
}

// =============================================================================
// Directory Tests
// =============================================================================

#[test]
fn test_create_dir_twice() {
    let (storage, temp_dir) = create_storage();

    storage.create_dir("testdir").unwrap();
    assert!(temp_dir.path().join("testdir").is_dir());

    assert!(matches!(
        storage.create_dir("testdir"),
        Err(FileWireError::AlreadyExists(_))
    ));
}

#[test]
fn test_create_dir_over_file() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "taken", b"x");

    assert!(matches!(
        storage.create_dir("taken"),
        Err(FileWireError::AlreadyExists(_))
    ));
}

#[test]
fn test_delete_empty_dir() {
    let (storage, temp_dir) = create_storage();
    fs::create_dir(temp_dir.path().join("empty")).unwrap();

    storage.delete_dir("empty").unwrap();
    assert!(!temp_dir.path().join("empty").exists());
}

#[test]
fn test_delete_non_empty_dir_leaves_it_untouched() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "full/inner.txt", b"x");

    assert!(matches!(
        storage.delete_dir("full"),
        Err(FileWireError::DirectoryNotEmpty(_))
    ));
    assert!(temp_dir.path().join("full/inner.txt").is_file());
}

#[test]
fn test_delete_dir_errors() {
    let (storage, temp_dir) = create_storage();
    write(temp_dir.path(), "file.txt", b"x");

    assert!(matches!(
        storage.delete_dir("missing"),
        Err(FileWireError::NotFound(_))
    ));
    assert!(matches!(
        storage.delete_dir("file.txt"),
        Err(FileWireError::NotADirectory(_))
    ));
}

#[test]
fn test_open_creates_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("served");

    let storage = StorageManager::open(&root).unwrap();
    assert!(root.is_dir());
    assert_eq!(storage.root(), root.as_path());
}
