use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub external_url: String,
    /// Popularity score in the 0-100 range reported by the remote catalog.
    pub popularity: u8,
    pub genres: Vec<String>,
    pub image_url: Option<String>,
}
