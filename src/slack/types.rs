//! Wire types for the handful of Web API methods this tool consumes.

use serde::Deserialize;

/// One page of the `files.list` response.
///
/// `ok: false` does not always mean "no data": throttled responses have
/// been observed to carry both an error string and a usable `files` array,
/// so the two fields are kept independent and the caller decides.
#[derive(Debug, Deserialize)]
pub struct FileListPage {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
}

/// A remote file as described by `files.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileDescriptor {
    pub id: String,
    pub name: String,
    /// Upload time, seconds since the epoch. Whole seconds for current
    /// uploads, but fractional values appear in old workspace exports.
    pub timestamp: f64,
    /// Id of the uploading user.
    pub user: String,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    /// Authenticated content URL. Absent on some externally hosted files.
    #[serde(default)]
    pub url_private_download: Option<String>,
}

/// Where a file lands locally: the first channel it was shared in wins,
/// then the first private group. Files shared in neither are unroutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Channel(&'a str),
    Group(&'a str),
}

impl FileDescriptor {
    pub fn route(&self) -> Option<Route<'_>> {
        if let Some(id) = self.channels.first() {
            return Some(Route::Channel(id));
        }
        self.groups.first().map(|id| Route::Group(id.as_str()))
    }
}

/// Shared shape of `users.info`, `channels.info` and `groups.info`: each
/// nests its record under a key named after the method's namespace.
#[derive(Debug, Deserialize)]
pub(crate) struct InfoResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, rename = "user", alias = "channel", alias = "group")]
    pub record: Option<NamedRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedRecord {
    #[serde(default)]
    pub name: Option<String>,
}
