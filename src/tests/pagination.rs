#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::Value;

    use crate::error::ProxyError;
    use crate::tests::common::{json, seed_token_file, token_manager, upstream_client, IdentityMock};

    fn items(range: std::ops::Range<u32>) -> Vec<Value> {
        range.map(|i| json!({"id": format!("e{i}")})).collect()
    }

    async fn ready(server: &MockServer, page_size: u32) -> (IdentityMock, tempfile::TempDir, crate::sources::UpstreamClient) {
        let identity = IdentityMock::ok(json!({"access_token": "new", "expires_in": 3600})).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        seed_token_file(&path, "tok", "stored-rt", 600).await;
        let tokens = Arc::new(token_manager(identity.token_url(), &path, None));
        let upstream = upstream_client(server.url("/api"), tokens, page_size);
        (identity, dir, upstream)
    }

    #[tokio::test]
    async fn concatenates_pages_until_a_short_page() {
        let server = MockServer::start_async().await;
        let (_identity, _dir, upstream) = ready(&server, 2).await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/timeentry").query_param("clientId", "c1").query_param("page", "1").query_param("pageSize", "2");
                then.status(200).json_body(json!({"items": items(0..2), "total": 5}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/timeentry").query_param("page", "2");
                then.status(200).json_body(json!(items(2..4)));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/timeentry").query_param("page", "3");
                then.status(200).json_body(json!({"items": items(4..5)}));
            })
            .await;
        let page4 = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/timeentry").query_param("page", "4");
                then.status(200).json_body(json!([]));
            })
            .await;

        let got = upstream
            .paginate(&upstream.url("timeentry"), &[("clientId", "c1".to_string())], 2)
            .await
            .unwrap();

        assert_eq!(got, items(0..5));
        assert_eq!(page4.hits_async().await, 0);
    }

    #[tokio::test]
    async fn full_pages_of_one_hundred_are_neither_duplicated_nor_truncated() {
        let server = MockServer::start_async().await;
        let (_identity, _dir, upstream) = ready(&server, 100).await;

        for (page, range) in [(1, 0..100), (2, 100..200), (3, 200..250)] {
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/api/project").query_param("page", page.to_string());
                    then.status(200).json_body(json!({"items": items(range), "total": 250}));
                })
                .await;
        }

        let got = upstream.paginate(&upstream.url("project"), &[], 100).await.unwrap();
        assert_eq!(got.len(), 250);
        assert_eq!(got, items(0..250));
    }

    #[tokio::test]
    async fn empty_page_ends_the_walk() {
        let server = MockServer::start_async().await;
        let (_identity, _dir, upstream) = ready(&server, 2).await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/project").query_param("page", "1");
                then.status(200).json_body(json!(items(0..2)));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/project").query_param("page", "2");
                then.status(200).json_body(json!({"items": [], "total": 2}));
            })
            .await;

        let got = upstream.paginate(&upstream.url("project"), &[], 2).await.unwrap();
        assert_eq!(got, items(0..2));
    }

    #[tokio::test]
    async fn failing_page_returns_what_was_collected() {
        let server = MockServer::start_async().await;
        let (_identity, _dir, upstream) = ready(&server, 2).await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/project").query_param("page", "1");
                then.status(200).json_body(json!(items(0..2)));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/project").query_param("page", "2");
                then.status(500).body("boom");
            })
            .await;

        let got = upstream.paginate(&upstream.url("project"), &[], 2).await.unwrap();
        assert_eq!(got, items(0..2));
    }

    #[tokio::test]
    async fn malformed_page_body_ends_the_walk() {
        let server = MockServer::start_async().await;
        let (_identity, _dir, upstream) = ready(&server, 2).await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/project").query_param("page", "1");
                then.status(200).json_body(json!(items(0..2)));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/project").query_param("page", "2");
                then.status(200).body("not json");
            })
            .await;

        let got = upstream.paginate(&upstream.url("project"), &[], 2).await.unwrap();
        assert_eq!(got.len(), 2);
    }

    #[tokio::test]
    async fn token_failures_are_not_swallowed() {
        let server = MockServer::start_async().await;
        let identity = IdentityMock::ok(json!({"access_token": "new", "expires_in": 3600})).await;
        let dir = tempfile::tempdir().unwrap();
        let tokens = Arc::new(token_manager(identity.token_url(), &dir.path().join("token.json"), None));
        let upstream = upstream_client(server.url("/api"), tokens, 2);

        let err = upstream.paginate(&upstream.url("project"), &[], 2).await.unwrap_err();
        assert!(matches!(err, ProxyError::Configuration(_)), "got {err:?}");
    }
}
