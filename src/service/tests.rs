//! Word Service Tests
//!
//! Covers tokenization, ingestion through the worker pool, the forwarding hook,
//! and the `/words/*` HTTP surface served by a real axum server.

#[cfg(test)]
mod tests {
    use crate::config::WalOptions;
    use crate::server::ApiServer;
    use crate::service::WordService;
    use crate::service::handlers::router;
    use crate::service::tokenizer::{split_phrase, split_terms};
    use crate::service::types::{ApiResponse, TextInput, WordResponse};
    use crate::storage::Database;
    use axum::body::Bytes;
    use std::path::Path;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    async fn open_service(dir: &Path) -> Arc<WordService> {
        let options = WalOptions {
            file_path: dir.join("wal.log"),
            ..Default::default()
        };
        let db = Database::open(&options).await.unwrap();
        WordService::new(Arc::new(db), 4)
    }

    async fn serve(service: Arc<WordService>) -> ApiServer {
        ApiServer::start("word API", "127.0.0.1:0".parse().unwrap(), router(service))
            .await
            .unwrap()
    }

    // ============================================================
    // TOKENIZER TESTS
    // ============================================================

    #[test]
    fn test_split_phrase_on_all_separators() {
        let words = split_phrase("Apple banana, apple-orange");
        assert_eq!(words, vec!["apple", "banana", "apple", "orange"]);

        let words = split_phrase("  one_two.three\tFOUR\n");
        assert_eq!(words, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_split_phrase_only_separators() {
        assert!(split_phrase(" ,.-_ ").is_empty());
        assert!(split_phrase("").is_empty());
    }

    #[test]
    fn test_split_terms_keeps_order() {
        assert_eq!(
            split_terms("Orange, apple,,BANANA"),
            vec!["orange", "apple", "banana"]
        );
    }

    #[test]
    fn test_text_input_validation() {
        assert_eq!(
            TextInput::parse(b"").unwrap_err(),
            "Request body is empty"
        );
        assert!(TextInput::parse(b"{not json").is_err());
        assert_eq!(
            TextInput::parse(br#"{"text": "   "}"#).unwrap_err(),
            "Text field is empty"
        );
        assert_eq!(
            TextInput::parse(br#"{"text": "hello"}"#).unwrap().text,
            "hello"
        );
    }

    #[test]
    fn test_envelope_parses_with_and_without_data() {
        // WordResponse has no Default; a missing `data` still reads as None.
        let body: ApiResponse<WordResponse> = serde_json::from_str(
            r#"{"status": "Not Found", "statusCode": 404, "message": "no such word"}"#,
        )
        .unwrap();
        assert!(body.data.is_none());
        assert_eq!(body.status_code, 404);
        assert_eq!(body.message.as_deref(), Some("no such word"));

        let body: ApiResponse<WordResponse> = serde_json::from_str(
            r#"{"status": "Success", "statusCode": 200, "data": {"word": "apple", "occurrences": 3}}"#,
        )
        .unwrap();
        assert_eq!(
            body.data,
            Some(WordResponse {
                word: "apple".to_string(),
                occurrences: 3
            })
        );
        assert!(body.message.is_none());
    }

    // ============================================================
    // SERVICE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_register_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(dir.path()).await;

        let inserted = service
            .register_words("Apple banana, apple-orange")
            .await
            .unwrap();

        assert_eq!(inserted, 4);
        assert_eq!(
            service.get_occurrences("apple,banana,orange,kiwi"),
            vec![
                WordResponse { word: "apple".into(), occurrences: 2 },
                WordResponse { word: "banana".into(), occurrences: 1 },
                WordResponse { word: "orange".into(), occurrences: 1 },
                WordResponse { word: "kiwi".into(), occurrences: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_registered_words_reach_the_wal() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(dir.path()).await;

        service.register_words("Red red BLUE").await.unwrap();
        service.database().wal().sync().await.unwrap();

        let log = std::fs::read_to_string(dir.path().join("wal.log")).unwrap();
        let mut lines: Vec<_> = log.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["blue", "red", "red"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_large_text_counts_every_word() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(dir.path()).await;
        let text = "same ".repeat(500);

        let inserted = service.register_words(&text).await.unwrap();

        assert_eq!(inserted, 500);
        assert_eq!(service.get_occurrences("same")[0].occurrences, 500);
    }

    #[tokio::test]
    async fn test_forward_without_channel_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(dir.path()).await;

        assert!(!service.is_forwarding().await);
        assert!(!service.forward(Bytes::from_static(b"{}")).await);
    }

    #[tokio::test]
    async fn test_forward_drops_when_channel_full() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(dir.path()).await;
        let (tx, mut rx) = mpsc::channel(1);
        service.set_forwarding(tx).await;

        assert!(service.forward(Bytes::from_static(b"first")).await);
        assert!(!service.forward(Bytes::from_static(b"second")).await);

        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"first"));

        service.unset_forwarding().await;
        assert!(!service.is_forwarding().await);
    }

    // ============================================================
    // HTTP TESTS
    // ============================================================

    #[tokio::test]
    async fn test_http_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(dir.path()).await;
        let server = serve(service).await;
        let base = format!("http://{}", server.local_addr());
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{}/words/register", base))
            .json(&serde_json::json!({ "text": "Apple banana, apple-orange" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: ApiResponse = resp.json().await.unwrap();
        assert_eq!(body.status, "Success");
        assert_eq!(body.message.as_deref(), Some("Text processed successfully"));

        let resp = client
            .get(format!("{}/words/occurrences?terms=apple,banana,orange", base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: ApiResponse<Vec<WordResponse>> = resp.json().await.unwrap();
        let counts: Vec<_> = body
            .data
            .unwrap()
            .into_iter()
            .map(|r| (r.word, r.occurrences))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("apple".to_string(), 2),
                ("banana".to_string(), 1),
                ("orange".to_string(), 1)
            ]
        );

        server.stop().await;
    }

    #[tokio::test]
    async fn test_http_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(dir.path()).await;
        let server = serve(service.clone()).await;
        let url = format!("http://{}/words/register", server.local_addr());
        let client = reqwest::Client::new();

        for body in ["", "{\"text\":", "{\"text\": \"\"}"] {
            let resp = client.post(&url).body(body).send().await.unwrap();
            assert_eq!(resp.status(), 400, "body {:?} should be rejected", body);
            let envelope: ApiResponse = resp.json().await.unwrap();
            assert_eq!(envelope.status_code, 400);
            assert!(envelope.message.is_some());
        }

        assert!(service.database().store().is_empty());
        server.stop().await;
    }

    #[tokio::test]
    async fn test_http_occurrences_without_terms() {
        let dir = tempfile::tempdir().unwrap();
        let server = serve(open_service(dir.path()).await).await;

        let resp = reqwest::get(format!("http://{}/words/occurrences", server.local_addr()))
            .await
            .unwrap();

        assert_eq!(resp.status(), 400);
        server.stop().await;
    }

    #[tokio::test]
    async fn test_http_write_is_queued_for_forwarding() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(dir.path()).await;
        let (tx, mut rx) = mpsc::channel(4);
        service.set_forwarding(tx).await;
        let server = serve(service).await;
        let payload = r#"{"text":"forward me"}"#;

        let resp = reqwest::Client::new()
            .post(format!("http://{}/words/register", server.local_addr()))
            .header("content-type", "application/json")
            .body(payload)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(rx.recv().await.unwrap(), Bytes::from(payload));
        server.stop().await;
    }
}
