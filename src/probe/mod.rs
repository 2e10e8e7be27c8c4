//! Reading the installed component's version from its native library.
//!
//! The library is loaded into a [`LibraryGuard`], both version exports are
//! called, their results are copied out, and the guard unloads the library
//! when it goes out of scope. Nothing borrowed from the library outlives the
//! guard, so the file is never held open while the caller renames it.

pub mod entry;
pub mod library;

pub use entry::{EntryPoint, Resolution, VERSION_INT, VERSION_STRING};
pub use library::{NativeLibrary, SystemLibrary};

use std::ffi::{c_char, c_void, CStr};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::error::{ModsyncError, Result};

/// Version read from the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbedVersion {
    /// Result of the version-string export.
    pub text: String,
    /// Result of the packed-integer export.
    pub packed: u32,
}

/// A loaded library that is unloaded on drop.
pub struct LibraryGuard<L: NativeLibrary> {
    library: Option<L>,
    path: PathBuf,
}

impl<L: NativeLibrary> LibraryGuard<L> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            library: Some(L::open(path)?),
            path: path.to_path_buf(),
        })
    }

    /// Resolve an entry point, trying each strategy in order.
    pub fn resolve(&self, entry: &EntryPoint) -> Result<NonNull<c_void>> {
        let library = self
            .library
            .as_ref()
            .ok_or_else(|| self.symbol_error(entry))?;

        for strategy in entry.strategies {
            if let Some(address) = library.address_of(strategy) {
                tracing::debug!("Resolved {} by {}", entry.label, strategy);
                return Ok(address);
            }
        }

        Err(self.symbol_error(entry))
    }

    fn symbol_error(&self, entry: &EntryPoint) -> ModsyncError {
        ModsyncError::SymbolResolution {
            entry: entry.describe(),
            path: self.path.clone(),
        }
    }
}

impl<L: NativeLibrary> Drop for LibraryGuard<L> {
    fn drop(&mut self) {
        if let Some(library) = self.library.take() {
            if let Err(e) = library.close() {
                tracing::warn!("{}", e);
            }
        }
    }
}

/// Reads the component version by calling the library's exports.
pub struct VersionProbe<L: NativeLibrary = SystemLibrary> {
    _library: PhantomData<L>,
}

impl<L: NativeLibrary> VersionProbe<L> {
    pub fn new() -> Self {
        Self {
            _library: PhantomData,
        }
    }

    /// Load `path`, call both version exports and unload.
    pub fn probe(&self, path: &Path) -> Result<ProbedVersion> {
        let guard = LibraryGuard::<L>::open(path)?;
        let version_string = guard.resolve(&VERSION_STRING)?;
        let version_int = guard.resolve(&VERSION_INT)?;

        // SAFETY: both exports take no arguments and use the C calling
        // convention; the returned string is copied before the guard drops
        let text = unsafe {
            let f: unsafe extern "C" fn() -> *const c_char =
                std::mem::transmute(version_string.as_ptr());
            let raw = f();
            if raw.is_null() {
                None
            } else {
                Some(CStr::from_ptr(raw).to_string_lossy().into_owned())
            }
        };

        // SAFETY: as above
        let packed = unsafe {
            let f: unsafe extern "C" fn() -> u32 = std::mem::transmute(version_int.as_ptr());
            f()
        };

        let text = text.ok_or_else(|| ModsyncError::SymbolResolution {
            entry: format!("{} (returned null)", VERSION_STRING.label),
            path: path.to_path_buf(),
        })?;

        tracing::debug!("{} reports version {} ({:#010x})", path.display(), text, packed);
        Ok(ProbedVersion { text, packed })
    }
}

impl<L: NativeLibrary> Default for VersionProbe<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;

    thread_local! {
        static OPENED: Cell<usize> = const { Cell::new(0) };
        static CLOSED: Cell<usize> = const { Cell::new(0) };
    }

    pub(crate) fn reset_counts() {
        OPENED.with(|c| c.set(0));
        CLOSED.with(|c| c.set(0));
    }

    pub(crate) fn open_count() -> usize {
        OPENED.with(Cell::get)
    }

    pub(crate) fn close_count() -> usize {
        CLOSED.with(Cell::get)
    }

    extern "C" fn fake_version() -> *const c_char {
        c"1.4.0".as_ptr()
    }

    extern "C" fn fake_version_int() -> u32 {
        0x0001_0400
    }

    extern "C" fn null_version() -> *const c_char {
        std::ptr::null()
    }

    fn addr(f: *const ()) -> NonNull<c_void> {
        NonNull::new(f as *mut c_void).unwrap()
    }

    /// Stand-in library whose exports depend on the file's contents:
    /// `named`, `ordinal`, `string-only` or `null-string`.
    pub(crate) struct FakeLibrary {
        exports: Vec<(Resolution, NonNull<c_void>)>,
    }

    impl NativeLibrary for FakeLibrary {
        fn open(path: &Path) -> Result<Self> {
            let kind = std::fs::read_to_string(path).map_err(|e| ModsyncError::LibraryNotFound {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            OPENED.with(|c| c.set(c.get() + 1));

            let text = addr(fake_version as *const ());
            let int = addr(fake_version_int as *const ());
            let exports = match kind.trim() {
                "named" => vec![
                    (Resolution::Name(c"HMVersion"), text),
                    (Resolution::Name(c"HMVersionInt"), int),
                ],
                "ordinal" => vec![(Resolution::Ordinal(1), text), (Resolution::Ordinal(2), int)],
                "string-only" => vec![(Resolution::Name(c"HMVersion"), text)],
                "null-string" => vec![
                    (Resolution::Name(c"HMVersion"), addr(null_version as *const ())),
                    (Resolution::Name(c"HMVersionInt"), int),
                ],
                _ => vec![],
            };
            Ok(Self { exports })
        }

        fn address_of(&self, resolution: &Resolution) -> Option<NonNull<c_void>> {
            self.exports
                .iter()
                .find(|(r, _)| r == resolution)
                .map(|(_, a)| *a)
        }

        fn close(self) -> Result<()> {
            CLOSED.with(|c| c.set(c.get() + 1));
            Ok(())
        }
    }

    fn library(kind: &str) -> (tempfile::TempDir, PathBuf) {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("HeatedMetal.dll");
        std::fs::write(&path, kind).unwrap();
        (temp, path)
    }

    #[test]
    fn resolves_by_name() {
        reset_counts();
        let (_temp, path) = library("named");
        let version = VersionProbe::<FakeLibrary>::new().probe(&path).unwrap();

        assert_eq!(version.text, "1.4.0");
        assert_eq!(version.packed, 0x0001_0400);
        assert_eq!(close_count(), 1);
    }

    #[test]
    fn falls_back_to_ordinals() {
        reset_counts();
        let (_temp, path) = library("ordinal");
        let version = VersionProbe::<FakeLibrary>::new().probe(&path).unwrap();

        assert_eq!(version.text, "1.4.0");
        assert_eq!(close_count(), 1);
    }

    #[test]
    fn unloads_when_symbol_resolution_fails() {
        reset_counts();
        let (_temp, path) = library("string-only");
        let err = VersionProbe::<FakeLibrary>::new().probe(&path).unwrap_err();

        match err {
            ModsyncError::SymbolResolution { entry, path: p } => {
                assert!(entry.contains("HMVersionInt"));
                assert!(entry.contains("ordinal 2"));
                assert_eq!(p, path);
            }
            other => panic!("expected SymbolResolution, got {other}"),
        }
        assert_eq!(open_count(), 1);
        assert_eq!(close_count(), 1);
    }

    #[test]
    fn unloads_when_no_exports_match() {
        reset_counts();
        let (_temp, path) = library("nothing");
        assert!(VersionProbe::<FakeLibrary>::new().probe(&path).is_err());
        assert_eq!(close_count(), 1);
    }

    #[test]
    fn null_string_is_an_error_and_unloads() {
        reset_counts();
        let (_temp, path) = library("null-string");
        let err = VersionProbe::<FakeLibrary>::new().probe(&path).unwrap_err();
        assert!(err.to_string().contains("returned null"));
        assert_eq!(close_count(), 1);
    }

    #[test]
    fn missing_library_never_loads() {
        reset_counts();
        let err = VersionProbe::<FakeLibrary>::new()
            .probe(Path::new("/nonexistent/HeatedMetal.dll"))
            .unwrap_err();
        assert!(matches!(err, ModsyncError::LibraryNotFound { .. }));
        assert_eq!(open_count(), 0);
        assert_eq!(close_count(), 0);
    }

    #[test]
    fn file_can_be_renamed_after_probe() {
        let (temp, path) = library("named");
        VersionProbe::<FakeLibrary>::new().probe(&path).unwrap();
        std::fs::rename(&path, temp.path().join("HeatedMetal.dll.vanilla")).unwrap();
    }
}
