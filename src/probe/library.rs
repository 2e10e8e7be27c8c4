//! Native library loading.

use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::error::{ModsyncError, Result};

use super::entry::Resolution;

/// A loaded native library.
pub trait NativeLibrary: Sized {
    /// Load the library without running or resolving its imports.
    fn open(path: &Path) -> Result<Self>;

    /// Address of an export, if `resolution` finds one.
    fn address_of(&self, resolution: &Resolution) -> Option<NonNull<c_void>>;

    /// Unload the library.
    fn close(self) -> Result<()>;
}

/// Operating-system loader via `libloading`.
pub struct SystemLibrary {
    #[cfg(windows)]
    inner: libloading::os::windows::Library,
    #[cfg(unix)]
    inner: libloading::os::unix::Library,
    path: PathBuf,
}

impl NativeLibrary for SystemLibrary {
    fn open(path: &Path) -> Result<Self> {
        let not_found = |message: String| ModsyncError::LibraryNotFound {
            path: path.to_path_buf(),
            message,
        };

        if !path.is_file() {
            return Err(not_found("file does not exist".to_string()));
        }

        #[cfg(windows)]
        // SAFETY: DONT_RESOLVE_DLL_REFERENCES maps the image without calling DllMain
        let inner = unsafe {
            libloading::os::windows::Library::load_with_flags(
                path,
                libloading::os::windows::DONT_RESOLVE_DLL_REFERENCES,
            )
        };

        #[cfg(unix)]
        // SAFETY: loading runs the library's initializers; the path comes from
        // the configured installation directory
        let inner = unsafe {
            libloading::os::unix::Library::open(
                Some(path),
                libloading::os::unix::RTLD_LAZY | libloading::os::unix::RTLD_LOCAL,
            )
        };

        let inner = inner.map_err(|e| not_found(e.to_string()))?;
        tracing::debug!("Loaded {}", path.display());

        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }

    fn address_of(&self, resolution: &Resolution) -> Option<NonNull<c_void>> {
        match resolution {
            Resolution::Name(name) => {
                // SAFETY: the symbol is only read as an address
                let symbol = unsafe { self.inner.get::<*mut c_void>(name.to_bytes_with_nul()) };
                symbol.ok().and_then(|s| NonNull::new(*s))
            }
            #[cfg(windows)]
            Resolution::Ordinal(ordinal) => {
                // SAFETY: the symbol is only read as an address
                let symbol = unsafe { self.inner.get_ordinal::<*mut c_void>(*ordinal) };
                symbol.ok().and_then(|s| NonNull::new(*s))
            }
            #[cfg(not(windows))]
            Resolution::Ordinal(_) => None,
        }
    }

    fn close(self) -> Result<()> {
        let path = self.path;
        self.inner.close().map_err(|e| {
            ModsyncError::Other(anyhow::anyhow!("failed to unload {}: {}", path.display(), e))
        })?;
        tracing::debug!("Unloaded {}", path.display());
        Ok(())
    }
}
