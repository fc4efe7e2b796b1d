//! Response shapes of the code-list and dataset APIs.
//!
//! Only the fields the pages need are modelled; everything else in the
//! upstream payloads is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Link {
    pub href: String,
    pub id: String,
}

/// `GET /code-lists?type=geography`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodeListResults {
    pub items: Vec<CodeList>,
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodeList {
    pub links: CodeListLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodeListLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub editions: Link,
}

/// `GET /code-lists/{id}/editions`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditionsListResults {
    pub items: Vec<EditionsList>,
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditionsList {
    pub edition: String,
    pub label: String,
    pub links: EditionsListLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditionsListLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub editions: Link,
    pub codes: Link,
}

/// `GET /code-lists/{id}/editions/{edition}/codes`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodesResults {
    pub items: Vec<Code>,
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Code {
    pub code: String,
    pub label: String,
    pub links: CodeLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodeLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub datasets: Link,
    pub code_list: Link,
}

/// `GET /code-lists/{id}/editions/{edition}/codes/{code}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodeResult {
    pub id: String,
    pub label: String,
    pub links: CodeLinks,
}

/// `GET /code-lists/{id}/editions/{edition}/codes/{code}/datasets`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetsResult {
    pub items: Vec<DatasetRef>,
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
    pub total_count: usize,
}

/// A dataset that uses a code, as listed by the code-list API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetRef {
    pub links: DatasetRefLinks,
    pub dimension_label: String,
    pub editions: Vec<DatasetEdition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetRefLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetEdition {
    pub links: DatasetEditionLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetEditionLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub dataset_dimension: Link,
    pub latest_version: Link,
}

/// `GET /datasets/{id}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatasetDetails {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// Authorised callers get the dataset wrapped as `{"next": .., "current": ..}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DatasetResponse {
    Wrapped { next: DatasetDetails },
    Plain(DatasetDetails),
}

impl From<DatasetResponse> for DatasetDetails {
    fn from(response: DatasetResponse) -> Self {
        match response {
            DatasetResponse::Wrapped { next } => next,
            DatasetResponse::Plain(details) => details,
        }
    }
}
