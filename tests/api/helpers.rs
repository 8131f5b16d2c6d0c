use std::sync::Arc;

use accounts::{
    app,
    clock::ManualClock,
    config::{AppConfig, JwtConfig},
    state::AppState,
    users::repo::InMemoryUserStore,
};
use serde_json::Value;

pub struct TestApp {
    pub address: String,
    pub clock: Arc<ManualClock>,
    pub client: reqwest::Client,
}

pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

pub async fn spawn_app() -> TestApp {
    let config = AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        jwt: JwtConfig {
            access_secret: "test-access-secret".into(),
            refresh_secret: "test-refresh-secret".into(),
            ttl_minutes: 30,
            refresh_ttl_minutes: 10080,
        },
    };
    let clock = Arc::new(ManualClock::starting_now());
    let state = AppState::from_parts(config, Arc::new(InMemoryUserStore::new()), clock.clone());

    let listener = app::bind(&state).await.expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let _ = tokio::spawn(app::serve(listener, app::build_app(state)));

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        clock,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub async fn register(&self, full_name: &str, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/users", &self.address))
            .json(&serde_json::json!({
                "full_name": full_name,
                "email": email,
                "password": password,
                "password_confirmation": password,
            }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/token", &self.address))
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login_tokens(&self, email: &str, password: &str) -> Tokens {
        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["token_type"], "bearer");
        Tokens {
            access: body["access_token"].as_str().unwrap().to_string(),
            refresh: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/token/refresh", &self.address))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(&format!("{}{}", &self.address, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(&format!("{}{}", &self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn change_password(&self, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/users/me/password", &self.address))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
