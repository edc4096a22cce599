//! count/offset pagination shared by every list operation.

use serde::Deserialize;

use crate::params::Params;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// `None` or `Some(0)` fall back to `DEFAULT_PAGE_SIZE`.
    pub count: Option<u32>,
    pub offset: u32,
}

impl ListOptions {
    pub fn new(count: u32, offset: u32) -> Self {
        Self {
            count: Some(count),
            offset,
        }
    }

    pub(crate) fn to_params(self) -> Params {
        let count = self
            .count
            .filter(|&count| count != 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let mut params = Params::new();
        params
            .insert("count", count.to_string())
            .insert("offset", self.offset.to_string());
        params
    }
}

/// `{"object": "list", "data": [...]}` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_page_size_25() {
        let params = ListOptions::default().to_params();
        assert_eq!(params.get("count"), Some("25"));
        assert_eq!(params.get("offset"), Some("0"));
    }

    #[test]
    fn zero_count_falls_back_to_default() {
        let params = ListOptions::new(0, 50).to_params();
        assert_eq!(params.encode(), "count=25&offset=50");
    }

    #[test]
    fn explicit_count_and_offset_pass_through() {
        assert_eq!(ListOptions::new(10, 5).to_params().encode(), "count=10&offset=5");
    }

    #[test]
    fn missing_data_decodes_as_empty() {
        let list: ListResponse<serde_json::Value> =
            serde_json::from_str(r#"{"object":"list"}"#).unwrap();
        assert!(list.data.is_empty());
    }
}
