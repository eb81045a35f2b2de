// SPDX-License-Identifier: AGPL-3.0-or-later

use std::env;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

/// Returns the absolute path of a file or directory, relative paths are resolved against the
/// current directory when it is known.
pub fn absolute_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if path.is_absolute() {
        return path.clean();
    }

    env::current_dir()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
        .clean()
}
