use std::env;

pub const ENV_CLIENT_ID: &str = "BQE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "BQE_CLIENT_SECRET";
pub const ENV_REFRESH_TOKEN: &str = "BQE_REFRESH_TOKEN";

/// OAuth2 client credentials plus the optional seed refresh token.
///
/// Read once at startup and never mutated afterwards.
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        refresh_token: Option<String>,
    ) -> Self {
        Self { client_id, client_secret, refresh_token }
    }

    pub fn from_env() -> Self {
        Self {
            client_id: non_empty_var(ENV_CLIENT_ID),
            client_secret: non_empty_var(ENV_CLIENT_SECRET),
            refresh_token: non_empty_var(ENV_REFRESH_TOKEN),
        }
    }
}

// secrets stay out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
