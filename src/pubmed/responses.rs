use serde::Deserialize;

/// ESearch JSON response (`retmode=json`)
#[derive(Debug, Deserialize)]
pub(crate) struct ESearchResult {
    pub esearchresult: ESearchData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ESearchData {
    pub idlist: Vec<String>,
}
