use serde::{Deserialize, Serialize};

/// A coverage proposal as delivered by the proposal service. Only the fields
/// the resolver consumes are modelled; the service sends more.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Proposal {
    #[serde(default)]
    pub radios: Vec<Radio>,
}

/// One radio within a proposal. `areasInteresse` is the service's wire name
/// for the attached coverage-file list; absent means empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Radio {
    #[serde(default, rename = "areasInteresse")]
    pub areas_of_interest: Vec<FileReference>,
}

/// A reference to an uploaded coverage file. Payloads use exactly one of
/// three shapes; variants are declared in resolution priority order, which is
/// also the order `serde(untagged)` tries them in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FileReference {
    Direct { url: String },
    Upload { file: FileUrl },
    External { external: FileUrl },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileUrl {
    pub url: String,
}

impl FileReference {
    /// The URL behind whichever form this reference carries, or `None` when
    /// the stored value is empty.
    pub fn resolve_url(&self) -> Option<&str> {
        let url = match self {
            FileReference::Direct { url } => url,
            FileReference::Upload { file } => &file.url,
            FileReference::External { external } => &external.url,
        };
        (!url.is_empty()).then_some(url.as_str())
    }
}

/// Scan radios in order and return the first resolvable file URL. Only the
/// first `areas_of_interest` entry of each radio is consulted, even when a
/// later entry would resolve; the scan moves on to the next radio instead.
pub fn find_area_file_url(radios: &[Radio]) -> Option<&str> {
    radios.iter().find_map(|radio| {
        radio
            .areas_of_interest
            .first()
            .and_then(FileReference::resolve_url)
    })
}
