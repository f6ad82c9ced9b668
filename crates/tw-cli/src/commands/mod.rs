pub mod characters;
pub mod languages;
pub mod play;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tw_session::{ClientConfig, HttpStoryGenerator, ScriptedGenerator, StoryCatalog, StoryGenerator};

/// Where stories come from.
pub enum Source {
    /// A recorded story on disk.
    Script(PathBuf),
    /// A story backend over HTTP.
    Http(ClientConfig),
}

/// The generator and catalog behind one [`Source`].
pub struct Backend {
    pub generator: Arc<dyn StoryGenerator>,
    pub catalog: Arc<dyn StoryCatalog>,
}

impl Source {
    /// Pick a source from CLI flags. A script wins over a URL; flags win over env.
    pub fn from_args(script: Option<PathBuf>, url: Option<String>, timeout: Option<u64>) -> Self {
        if let Some(path) = script {
            return Self::Script(path);
        }
        let mut config = ClientConfig::from_env();
        if let Some(url) = url {
            config = config.with_base_url(&url);
        }
        if let Some(secs) = timeout {
            config = config.with_timeout_secs(secs);
        }
        Self::Http(config)
    }

    /// Load the script or build the HTTP client.
    pub fn connect(&self) -> Result<Backend, String> {
        match self {
            Self::Script(path) => {
                let scripted =
                    Arc::new(ScriptedGenerator::from_file(path).map_err(|e| e.to_string())?);
                Ok(Backend {
                    generator: scripted.clone(),
                    catalog: scripted,
                })
            }
            Self::Http(config) => {
                tracing::debug!(url = %config.base_url, "using story backend");
                let http = Arc::new(HttpStoryGenerator::new(config).map_err(|e| e.to_string())?);
                Ok(Backend {
                    generator: http.clone(),
                    catalog: http,
                })
            }
        }
    }
}

/// Single-threaded runtime for driving async calls from the CLI.
fn runtime() -> Result<Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))
}
