/// Anything that goes wrong while talking to Heroku.
#[derive(Debug, thiserror::Error)]
pub enum HerokuError {
    #[error("Error calling Heroku API: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Heroku API returned {status} for {url}: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    #[error("Error running Heroku command '{command}': {stderr}")]
    Command { command: String, stderr: String },

    #[error("Failed to start Heroku command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No deployments found in API response.")]
    NoDeployments,
}
