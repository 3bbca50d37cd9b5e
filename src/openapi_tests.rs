#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_schema_generation() {
        // Test that the OpenAPI schema can be generated without errors
        let openapi = ApiDoc::openapi();

        assert!(openapi.components.is_some());
        let components = openapi.components.as_ref().unwrap();

        assert!(components.schemas.contains_key("ErrorResponse"));
        assert!(components.schemas.contains_key("HealthResponse"));
        assert!(components.schemas.contains_key("PostJournalRequest"));
        assert!(components.schemas.contains_key("ReportFigures"));

        // Verify that the schema can be serialized to JSON without errors
        let json_result = serde_json::to_string(&openapi);
        assert!(json_result.is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let error_response_schema = components.schemas.get("ErrorResponse").unwrap();

        if let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(obj)) =
            error_response_schema
        {
            let properties = &obj.properties;
            assert!(properties.contains_key("error"));
            assert!(properties.contains_key("code"));
            assert!(properties.contains_key("success"));
        } else {
            panic!("ErrorResponse should be an object schema");
        }
    }

    #[test]
    fn test_openapi_paths_cover_every_module() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/v1/accounts"));
        assert!(paths.contains_key("/api/v1/accounts/{account_id}/balance"));
        assert!(paths.contains_key("/api/v1/ledger/journals"));
        assert!(paths.contains_key("/api/v1/payables/{payable_id}/payments"));
        assert!(paths.contains_key("/api/v1/receivables/{receivable_id}/receipts"));
        assert!(paths.contains_key("/api/v1/commissions/tiers"));
        assert!(paths.contains_key("/api/v1/campaigns/{campaign_id}/roi"));
        assert!(paths.contains_key("/api/v1/reports"));
        assert!(paths.contains_key("/api/v1/automation/runs"));
    }

    #[test]
    fn test_all_error_responses_reference_correct_schema() {
        let openapi = ApiDoc::openapi();
        let openapi_json = serde_json::to_string(&openapi).unwrap();

        // Ensure no module-path-mangled references exist
        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));

        assert!(openapi_json.contains("ErrorResponse"));
    }
}
