//! Constants for the hosted PostgREST backend

/// REST path prefix on the hosted backend
pub const REST_BASE_PATH: &str = "/rest/v1";

/// Auth path prefix on the hosted backend
pub const AUTH_BASE_PATH: &str = "/auth/v1";

/// Table names
pub mod tables {
    pub const TEMPLATES: &str = "templates";
    pub const QUESTIONS: &str = "questions";
    pub const OPTIONS: &str = "options";
    pub const ANSWERS: &str = "answers";
}

/// Standard headers for backend requests
pub mod headers {
    /// Content type for JSON requests
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// Project key header expected next to the bearer token
    pub const API_KEY: &str = "apikey";

    /// Prefer header for returning the written rows
    pub const PREFER_RETURN_REPRESENTATION: &str = "return=representation";

    /// Prefer header for upserts keyed by primary key
    pub const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=representation";

    /// Prefer header when the response body is not needed
    pub const PREFER_RETURN_MINIMAL: &str = "return=minimal";

    /// Correlation header attached to every request
    pub const X_CORRELATION_ID: &str = "x-correlation-id";
}

/// Embedded select used when fetching a template for editing
pub const TEMPLATE_TREE_SELECT: &str = "*,questions(*,options(*))";

/// Build table endpoint URL
pub fn table_endpoint(base_url: &str, table: &str) -> String {
    format!("{}{}/{}", base_url.trim_end_matches('/'), REST_BASE_PATH, table)
}

/// Build password sign-in endpoint URL
pub fn password_grant_endpoint(base_url: &str) -> String {
    format!("{}{}/token?grant_type=password", base_url.trim_end_matches('/'), AUTH_BASE_PATH)
}

/// PostgREST equality filter value
pub fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// PostgREST membership filter value
pub fn in_list(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(
            table_endpoint("https://abc.supabase.co/", tables::OPTIONS),
            "https://abc.supabase.co/rest/v1/options"
        );
        assert_eq!(
            password_grant_endpoint("https://abc.supabase.co"),
            "https://abc.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn test_filters() {
        assert_eq!(eq("12"), "eq.12");
        assert_eq!(in_list(&["a".to_string(), "b".to_string()]), "in.(\"a\",\"b\")");
    }
}
