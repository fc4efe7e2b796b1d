//! Page models handed to the renderer as JSON.

use serde::{Deserialize, Serialize};

pub const HOME_URI: &str = "https://www.ons.gov.uk";
pub const GEOGRAPHY_URI: &str = "/geography";

/// Fields common to every page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub language: String,
    pub beta_banner_enabled: bool,
    pub enable_loop11: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy_domain: Option<String>,
    pub cookies_preferences_set: bool,
    pub cookies_policy: CookiesPolicy,
    pub metadata: Metadata,
    pub breadcrumb: Vec<TaxonomyNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookiesPolicy {
    pub essential: bool,
    pub usage: bool,
}

impl Default for CookiesPolicy {
    fn default() -> Self {
        Self {
            essential: true,
            usage: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub title: String,
    pub uri: String,
}

impl TaxonomyNode {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// A linked entry on the homepage or list page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub label: String,
    pub id: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub label: String,
    pub description: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemsData {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomepagePage {
    #[serde(flatten)]
    pub page: Page,
    pub data: ItemsData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    #[serde(flatten)]
    pub page: Page,
    pub data: ItemsData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaPage {
    #[serde(flatten)]
    pub page: Page,
    pub data: AreaData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaData {
    pub attributes: AreaAttributes,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaAttributes {
    pub code: String,
}

/// Breadcrumb trail: Home, Geography, then the code list and the code when known.
pub fn breadcrumb(code_list: Option<(&str, &str)>, code: Option<(&str, &str)>) -> Vec<TaxonomyNode> {
    let mut trail = vec![
        TaxonomyNode::new("Home", HOME_URI),
        TaxonomyNode::new("Geography", GEOGRAPHY_URI),
    ];

    if let Some((code_list_id, label)) = code_list {
        trail.push(TaxonomyNode::new(
            label,
            format!("{}/{}", GEOGRAPHY_URI, code_list_id),
        ));

        if let Some((code_id, label)) = code {
            trail.push(TaxonomyNode::new(
                label,
                format!("{}/{}/{}", GEOGRAPHY_URI, code_list_id, code_id),
            ));
        }
    }

    trail
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_breadcrumb_homepage() {
        let trail = breadcrumb(None, None);
        assert_eq!(
            trail,
            vec![
                TaxonomyNode::new("Home", "https://www.ons.gov.uk"),
                TaxonomyNode::new("Geography", "/geography"),
            ]
        );
    }

    #[test]
    fn test_breadcrumb_area_page() {
        let trail = breadcrumb(
            Some(("local-authority", "Local authority districts")),
            Some(("E06000028", "Bournemouth")),
        );
        assert_eq!(trail.len(), 4);
        assert_eq!(
            trail[2],
            TaxonomyNode::new("Local authority districts", "/geography/local-authority")
        );
        assert_eq!(
            trail[3],
            TaxonomyNode::new("Bournemouth", "/geography/local-authority/E06000028")
        );
    }

    #[test]
    fn test_page_flattened_json() {
        let page = ListPage {
            page: Page {
                language: "en".to_string(),
                beta_banner_enabled: true,
                metadata: Metadata {
                    title: "Local authority districts".to_string(),
                },
                ..Default::default()
            },
            data: ItemsData::default(),
        };

        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["language"], "en");
        assert_eq!(value["metadata"]["title"], "Local authority districts");
        assert_eq!(value["cookies_policy"], json!({"essential": true, "usage": false}));
        assert_eq!(value["data"]["items"], json!([]));
        assert!(value.get("taxonomy_domain").is_none());
    }
}
