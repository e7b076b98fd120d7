use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::info;

use crate::download::sanitize_file_name;
use crate::error::Result;

/// Somewhere outside the viewer that can show a resource: a browser tab,
/// the platform's default application.
pub trait ExternalSurface {
    /// `bytes` is supplied for locally held content, which has no locator
    /// an outside program could load on its own. A surface that has to
    /// write those bytes somewhere returns the file so the caller decides
    /// when it goes away.
    fn present(
        &self,
        name: &str,
        uri: &str,
        bytes: Option<&[u8]>,
    ) -> Result<Option<ScratchFile>>;
}

/// A file written for an outside program to read. Dropping it deletes the
/// file together with the private directory it lives in.
#[derive(Debug)]
pub struct ScratchFile {
    dir: TempDir,
    path: PathBuf,
}

impl ScratchFile {
    /// Write `bytes` under `parent`, keeping `name` so the receiving program
    /// sees a meaningful file name and extension.
    pub fn write(parent: &Path, name: &str, bytes: &[u8]) -> Result<Self> {
        std::fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new().prefix("open-").tempdir_in(parent)?;
        let path = dir.path().join(sanitize_file_name(name));
        std::fs::write(&path, bytes)?;
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Hands resources to the operating system's default opener.
pub struct SystemOpener {
    scratch_dir: PathBuf,
}

impl Default for SystemOpener {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("folio"))
    }
}

impl SystemOpener {
    pub fn new(scratch_dir: PathBuf) -> Self {
        Self { scratch_dir }
    }
}

impl ExternalSurface for SystemOpener {
    fn present(
        &self,
        name: &str,
        uri: &str,
        bytes: Option<&[u8]>,
    ) -> Result<Option<ScratchFile>> {
        match bytes {
            Some(bytes) => {
                let scratch = ScratchFile::write(&self.scratch_dir, name, bytes)?;
                info!("Opening {} externally", scratch.path().display());
                launch(scratch.path().as_os_str())?;
                Ok(Some(scratch))
            }
            None => {
                info!("Opening {uri} externally");
                launch(OsStr::new(uri))?;
                Ok(None)
            }
        }
    }
}

#[cfg(target_os = "macos")]
fn launch(target: &OsStr) -> Result<()> {
    Command::new("open").arg(target).spawn()?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn launch(target: &OsStr) -> Result<()> {
    Command::new("cmd").args(["/C", "start", ""]).arg(target).spawn()?;
    Ok(())
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn launch(target: &OsStr) -> Result<()> {
    Command::new("xdg-open").arg(target).spawn()?;
    Ok(())
}
