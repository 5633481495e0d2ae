//! OpenAPI schema definitions for pagination envelopes.
//!
//! The `pagination` crate stays free of OpenAPI concerns, so the envelope it
//! produces is described here through mirror types registered with utoipa.
//! Field names follow the camelCase JSON the envelope serialises to.

use utoipa::ToSchema;

use crate::domain::PostView;

/// OpenAPI schema for [`pagination::PageWindow`].
#[derive(ToSchema)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageWindowSchema {
    /// Requested page number, as given.
    #[schema(example = 1)]
    current_page: i64,
    /// `ceil(allCount / limit)`.
    #[schema(example = 3)]
    total_pages: u64,
    has_next: bool,
    has_prev: bool,
    next_page: i64,
    prev_page: i64,
    /// Items skipped before this page; negative for pages below one.
    offset: i64,
    #[schema(example = 2)]
    limit: u64,
}

/// OpenAPI schema for the home feed page (`Page<PostView>`).
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PostPageSchema {
    /// Posts on this page, most recent first.
    items: Vec<PostView>,
    #[serde(flatten)]
    window: PageWindowSchema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn window_schema_uses_camel_case() {
        let schema_json = schema_to_json::<PageWindowSchema>();

        assert!(schema_json.contains("totalPages"));
        assert!(schema_json.contains("hasPrev"));
        assert!(!schema_json.contains("total_pages"));
    }

    #[test]
    fn post_page_schema_lists_items_and_window() {
        let schema_json = schema_to_json::<PostPageSchema>();

        assert!(schema_json.contains("items"));
        assert!(schema_json.contains("currentPage"));
    }
}
