//! REST v4 client for GitLab project variables.

use crate::types::{CreateVariableRequest, EditVariableRequest};
use crate::{GitLabConnector, GitLabError, ProjectVariable, ProjectVariables, Result, VariableOptions};
use async_trait::async_trait;
use glvar_secrets::SecureSecret;
use reqwest::{Client, Response, Url};
use tracing::{debug, info};

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("glvar/", env!("CARGO_PKG_VERSION"));

/// Authenticated client for one GitLab server.
pub struct GitLabClient {
    client: Client,
    base_url: Url,
    token: SecureSecret,
}

impl std::fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token)
            .finish()
    }
}

impl GitLabClient {
    /// Create a client for `server_url`.
    ///
    /// The URL may carry a path prefix for instances served from a sub-path
    /// (`https://example.com/gitlab`).
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError::InvalidServerUrl`] if the URL does not parse or is
    /// not http(s), and [`GitLabError::Http`] if the HTTP client cannot be built.
    pub fn new(server_url: &str, token: SecureSecret, user_agent: &str) -> Result<Self> {
        let base_url = parse_server_url(server_url)?;
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Build `<base>/api/v4/projects/<project>/variables[/<key>]`.
    ///
    /// Project id and key are pushed as single segments, so `group/project`
    /// is sent as `group%2Fproject`.
    pub(crate) fn variables_url(&self, project_id: &str, key: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|()| GitLabError::InvalidServerUrl {
                        url: self.base_url.to_string(),
                        message: "URL cannot be a base".to_string(),
                    })?;
            segments
                .pop_if_empty()
                .extend(["api", "v4", "projects", project_id, "variables"]);
            if let Some(key) = key {
                segments.push(key);
            }
        }
        Ok(url)
    }

    async fn check(operation: &'static str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GitLabError::Api {
            operation,
            status: status.as_u16(),
            message,
        })
    }
}

fn parse_server_url(server_url: &str) -> Result<Url> {
    let url = Url::parse(server_url).map_err(|e| GitLabError::InvalidServerUrl {
        url: server_url.to_string(),
        message: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(GitLabError::InvalidServerUrl {
            url: server_url.to_string(),
            message: "expected an http(s) URL".to_string(),
        });
    }

    Ok(url)
}

#[async_trait]
impl ProjectVariables for GitLabClient {
    async fn create_variable(
        &self,
        project_id: &str,
        key: &str,
        value: &SecureSecret,
        options: VariableOptions,
    ) -> Result<ProjectVariable> {
        let url = self.variables_url(project_id, None)?;
        debug!(%url, project_id, key, "Creating GitLab variable");

        let body = CreateVariableRequest {
            key,
            value: value.expose(),
            protected: options.protected,
            masked: options.masked,
        };
        let response = self
            .client
            .post(url)
            .bearer_auth(self.token.expose())
            .json(&body)
            .send()
            .await?;
        let variable: ProjectVariable = Self::check("create variable", response)
            .await?
            .json()
            .await?;

        info!(
            project_id,
            key = %variable.key,
            protected = variable.protected,
            masked = variable.masked,
            "Created GitLab variable"
        );
        Ok(variable)
    }

    async fn edit_variable(
        &self,
        project_id: &str,
        key: &str,
        value: &SecureSecret,
        options: VariableOptions,
    ) -> Result<ProjectVariable> {
        let url = self.variables_url(project_id, Some(key))?;
        debug!(%url, project_id, key, "Updating GitLab variable");

        let body = EditVariableRequest {
            value: value.expose(),
            protected: options.protected,
            masked: options.masked,
        };
        let response = self
            .client
            .put(url)
            .bearer_auth(self.token.expose())
            .json(&body)
            .send()
            .await?;
        let variable: ProjectVariable = Self::check("edit variable", response)
            .await?
            .json()
            .await?;

        info!(
            project_id,
            key = %variable.key,
            protected = variable.protected,
            masked = variable.masked,
            "Updated GitLab variable"
        );
        Ok(variable)
    }

    async fn delete_variable(&self, project_id: &str, key: &str) -> Result<()> {
        let url = self.variables_url(project_id, Some(key))?;
        debug!(%url, project_id, key, "Deleting GitLab variable");

        let response = self
            .client
            .delete(url)
            .bearer_auth(self.token.expose())
            .send()
            .await?;
        Self::check("delete variable", response).await?;

        info!(project_id, key, "Deleted GitLab variable");
        Ok(())
    }
}

/// [`GitLabConnector`] that builds a fresh [`GitLabClient`] per call.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    user_agent: String,
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

impl HttpConnector {
    /// Create a connector sending `user_agent` on every request
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl GitLabConnector for HttpConnector {
    fn connect(
        &self,
        server_url: &str,
        token: &SecureSecret,
    ) -> Result<Box<dyn ProjectVariables>> {
        let client = GitLabClient::new(server_url, token.clone(), &self.user_agent)?;
        Ok(Box::new(client))
    }
}
