//! Agent (service registration) API tests against a mock Consul agent.

use warden_consul_client::{
    AgentServiceCheck, AgentServiceRegistration, ConsulClient, ConsulClientConfig,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn register_service_sends_descriptor_with_grpc_check() {
    let server = MockServer::start().await;

    let registration = AgentServiceRegistration {
        id: Some("shard-3-agent".to_string()),
        name: "shard-worker".to_string(),
        tags: Some(vec!["grpc".to_string(), "shard".to_string()]),
        address: Some("10.0.0.5".to_string()),
        port: Some(9090),
        meta: None,
        check: Some(AgentServiceCheck {
            check_id: None,
            name: None,
            interval: Some("10s".to_string()),
            grpc: Some("10.0.0.5:9090/shard-worker".to_string()),
            timeout: None,
            deregister_critical_service_after: Some("30m".to_string()),
        }),
    };

    Mock::given(method("PUT"))
        .and(path("/v1/agent/service/register"))
        .and(body_json(serde_json::json!({
            "ID": "shard-3-agent",
            "Name": "shard-worker",
            "Tags": ["grpc", "shard"],
            "Address": "10.0.0.5",
            "Port": 9090,
            "Check": {
                "Interval": "10s",
                "GRPC": "10.0.0.5:9090/shard-worker",
                "DeregisterCriticalServiceAfter": "30m"
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = ConsulClient::new(ConsulClientConfig::new(&server.uri())).unwrap();
    client.register_service(&registration).await.unwrap();
}

#[tokio::test]
async fn deregister_service_hits_deregister_path() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/agent/service/deregister/shard-3-agent"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = ConsulClient::new(ConsulClientConfig::new(&server.uri())).unwrap();
    client.deregister_service("shard-3-agent").await.unwrap();
}

#[tokio::test]
async fn acl_token_is_sent_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/agent/service/deregister/svc"))
        .and(header("X-Consul-Token", "secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = ConsulClient::new(
        ConsulClientConfig::new(&server.uri()).with_token("secret"),
    )
    .unwrap();
    client.deregister_service("svc").await.unwrap();
}
