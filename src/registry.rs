use crate::error::Result;
use crate::github::GithubClient;
use crate::models::{RepositoryId, TrackedRepo};
use crate::store::RepoStore;

/// Starts tracking a repository after confirming it exists on GitHub.
///
/// Registering an already tracked repository returns the existing row.
pub async fn register(store: &RepoStore, github: &GithubClient, raw: &str) -> Result<TrackedRepo> {
    let repo: RepositoryId = raw.parse()?;
    github.check_repository(&repo).await?;
    store.insert_or_get(&repo).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::AppError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn registers_existing_repository_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = RepoStore::connect("sqlite::memory:").await.unwrap();
        let github = GithubClient::new(&Settings::for_api(server.uri(), None)).unwrap();

        let first = register(&store, &github, "octocat/Hello-World").await.unwrap();
        let again = register(&store, &github, "https://github.com/octocat/Hello-World")
            .await
            .unwrap();
        assert_eq!(first.id, again.id);
    }

    #[tokio::test]
    async fn unknown_repository_is_not_stored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = RepoStore::connect("sqlite::memory:").await.unwrap();
        let github = GithubClient::new(&Settings::for_api(server.uri(), None)).unwrap();

        let err = register(&store, &github, "octocat/nope").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRepository(_)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_identifier_skips_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = RepoStore::connect("sqlite::memory:").await.unwrap();
        let github = GithubClient::new(&Settings::for_api(server.uri(), None)).unwrap();

        for raw in ["not-a-repo", "octo/hello#x", "../users"] {
            let err = register(&store, &github, raw).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidRepository(_)), "{raw}");
        }
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_registrations_share_one_row() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/Hello-World"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = RepoStore::connect("sqlite::memory:").await.unwrap();
        let github = GithubClient::new(&Settings::for_api(server.uri(), None)).unwrap();

        let (a, b) = tokio::join!(
            register(&store, &github, "octocat/Hello-World"),
            register(&store, &github, "octocat/Hello-World"),
        );
        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
