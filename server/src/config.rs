use crate::policy::{MaxStepPolicy, MovePolicy, PermissiveMovePolicy};

/// Secret used when `AUTH_SECRET` is not set. Fine for local play only.
pub const DEV_AUTH_SECRET: &str = "blockverse-dev-secret";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("listen_addr must not be empty")]
    EmptyListenAddr,
    #[error("auth_secret must be at least 16 bytes")]
    WeakSecret,
    #[error("{0} must be at least 1")]
    ZeroCapacity(&'static str),
    #[error("max_step must be finite and > 0")]
    InvalidMaxStep,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// HS256 key for identity tokens
    pub auth_secret: String,
    /// Queued outgoing messages per connection before drops start
    pub outbox_capacity: usize,
    /// Queued commands into the relay task
    pub command_capacity: usize,
    pub max_connections: usize,
    pub max_message_bytes: usize,
    /// Largest accepted move step. `None` trusts the client.
    pub max_step: Option<f64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3001".to_string(),
            auth_secret: DEV_AUTH_SECRET.to_string(),
            outbox_capacity: 256,
            command_capacity: 1024,
            max_connections: 1000,
            max_message_bytes: 16 * 1024,
            max_step: None,
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(secret) = std::env::var("AUTH_SECRET") {
            config.auth_secret = secret;
        }

        if let Some(v) = env_usize("OUTBOX_CAPACITY") {
            config.outbox_capacity = v;
        }

        if let Some(v) = env_usize("MAX_CONNECTIONS") {
            config.max_connections = v;
        }

        if let Ok(raw) = std::env::var("MAX_STEP") {
            match raw.parse::<f64>() {
                Ok(step) => config.max_step = Some(step),
                Err(_) => tracing::warn!("Invalid MAX_STEP '{}', trusting client moves", raw),
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.trim().is_empty() {
            return Err(ConfigError::EmptyListenAddr);
        }
        if self.auth_secret.len() < 16 {
            return Err(ConfigError::WeakSecret);
        }
        if self.outbox_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("outbox_capacity"));
        }
        if self.command_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("command_capacity"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::ZeroCapacity("max_connections"));
        }
        if let Some(step) = self.max_step {
            if !step.is_finite() || step <= 0.0 {
                return Err(ConfigError::InvalidMaxStep);
            }
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.auth_secret == DEV_AUTH_SECRET
    }

    /// Move policy selected by this config.
    pub fn move_policy(&self) -> Box<dyn MovePolicy> {
        match self.max_step {
            Some(max_step) => Box::new(MaxStepPolicy { max_step }),
            None => Box::new(PermissiveMovePolicy),
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.parse::<usize>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            None
        }
    }
}
