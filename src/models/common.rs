use super::{Page, PaginationInfo};
use serde::Serialize;

/// Success envelope: `{ success, data, [count], [pagination], [message] }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            pagination: None,
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        Self {
            count: Some(items.len()),
            ..Self::success(items)
        }
    }

    pub fn page(page: Page<T>) -> Self {
        Self {
            count: Some(page.items.len()),
            pagination: Some(page.pagination),
            ..Self::success(page.items)
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            count: None,
            pagination: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationParams;
    use serde_json::json;

    #[test]
    fn test_page_envelope() {
        let params = PaginationParams::new(Some(2), Some(2)).unwrap();
        let page = Page {
            items: vec![3, 4],
            pagination: params.info(5),
        };
        let value = serde_json::to_value(ApiResponse::page(page)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "data": [3, 4],
                "count": 2,
                "pagination": { "page": 2, "limit": 2, "total": 5, "pages": 3 }
            })
        );
    }

    #[test]
    fn test_message_envelope() {
        let value = serde_json::to_value(ApiResponse::message("Deleted")).unwrap();
        assert_eq!(value, json!({ "success": true, "message": "Deleted" }));
    }
}
