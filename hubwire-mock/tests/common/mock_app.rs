use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use hubwire_api::{CONTENT_TYPE, Message};
use hubwire_mock::bus::HubBus;
use hubwire_mock::create_app;
use tower::ServiceExt;

pub struct MockApp {
    pub bus: Arc<HubBus>,
    pub router: Router,
}

impl MockApp {
    pub fn new() -> Self {
        Self::with_capacity(32)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let bus = Arc::new(HubBus::new(capacity, 64));
        let router = create_app(bus.clone());

        Self { bus, router }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Vec<u8>) -> Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .method(method)
            .header(header::CONTENT_TYPE, CONTENT_TYPE)
            .body(Body::from(body))
            .unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Method::GET, uri, Vec::new()).await
    }

    pub async fn post<M: Message>(&self, uri: &str, message: &M) -> Response<Body> {
        self.send(Method::POST, uri, message.encode_to_vec()).await
    }

    pub async fn post_empty(&self, uri: &str) -> Response<Body> {
        self.send(Method::POST, uri, Vec::new()).await
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn decode_body<M: Message>(response: Response<Body>) -> M {
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        CONTENT_TYPE
    );
    M::decode(&body_bytes(response).await).unwrap()
}
