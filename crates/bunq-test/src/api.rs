use bunq_api_base::ReqwestTransport;

/// Helper for testing the bunq API using wiremock.
///
/// Warning: when using `Mock::expect` ensure `server` is not dropped before the test completes.
pub async fn start_api_mock(mocks: Vec<wiremock::Mock>) -> (wiremock::MockServer, ReqwestTransport) {
    let server = wiremock::MockServer::start().await;

    for mock in mocks {
        server.register(mock).await;
    }

    let transport = ReqwestTransport::new(server.uri()).expect("HTTP client builds");

    (server, transport)
}
