//! Root wire types. A root's URI is its identity; there is no item read
//! endpoint and no update.

use serde::{Deserialize, Serialize};

use super::{Entity, NoUpdate, ReadPath};

/// A filesystem or URI root, used both as create body and response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Entity for Root {
    const KIND: &'static str = "root";
    const COLLECTION: &'static str = "/roots";
    const READ_PATH: ReadPath = ReadPath::Scan;
    const INACTIVE_FILTER: bool = false;

    type Create = Root;
    type Update = NoUpdate;

    fn identity(&self) -> &str {
        &self.uri
    }
}
