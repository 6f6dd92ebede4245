//! Module service: which repositories can become modules, and registering
//! or removing them.

use modulehub_common::{
    error::{ModuleHubError, ModuleHubResult},
    models::module::{Module, NewModule},
};
use modulehub_db::repository::ModuleMapper;
use modulehub_github::{Repository, RepositoryCollection, RepositoryRetriever};

pub struct ModuleService<'a> {
    modules: &'a dyn ModuleMapper,
    github: &'a dyn RepositoryRetriever,
}

impl<'a> ModuleService<'a> {
    pub fn new(modules: &'a dyn ModuleMapper, github: &'a dyn RepositoryRetriever) -> Self {
        Self { modules, github }
    }

    /// Repositories from `repositories` the user could register: not forks,
    /// pushable, not registered yet, and shipping a module class.
    pub async fn candidates(
        &self,
        repositories: RepositoryCollection,
        token: &str,
    ) -> ModuleHubResult<Vec<Repository>> {
        let mut candidates = Vec::new();
        for repository in repositories {
            if repository.fork || !repository.can_push() {
                continue;
            }
            if self.modules.find_by_name(&repository.name).await?.is_some() {
                continue;
            }
            if !self.github.is_module(&repository, Some(token)).await? {
                continue;
            }
            candidates.push(repository);
        }
        Ok(candidates)
    }

    /// Register `owner/repo`, or refresh it if it is already registered.
    pub async fn register(&self, owner: &str, repo: &str, token: &str) -> ModuleHubResult<Module> {
        let repository = self.pushable_repository(owner, repo, token, "add").await?;

        if !self.github.is_module(&repository, Some(token)).await? {
            return Err(ModuleHubError::Forbidden {
                message: format!("{} is not a module", repository.name),
            });
        }

        let module = self.modules.upsert(&new_module(&repository)).await?;
        tracing::info!("Registered module {}/{} ({})", module.owner, module.name, module.id);
        Ok(module)
    }

    /// Remove the module registered for `owner/repo`.
    pub async fn unregister(&self, owner: &str, repo: &str, token: &str) -> ModuleHubResult<Module> {
        let repository = self.pushable_repository(owner, repo, token, "remove").await?;

        let module = self
            .modules
            .find_by_url(&repository.html_url)
            .await?
            .ok_or_else(|| ModuleHubError::NotFound {
                resource: format!("Module {}", repository.full_name),
            })?;

        self.modules.delete(module.id).await?;
        tracing::info!("Removed module {}/{} ({})", module.owner, module.name, module.id);
        Ok(module)
    }

    /// Fetch `owner/repo` with the user's token and require push access to a
    /// non-fork repository.
    async fn pushable_repository(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
        verb: &str,
    ) -> ModuleHubResult<Repository> {
        let repository = self
            .github
            .user_repository_metadata(owner, repo, Some(token))
            .await?
            .ok_or_else(|| {
                ModuleHubError::Upstream(format!("not able to fetch {owner}/{repo} from GitHub"))
            })?;

        if repository.fork || !repository.can_push() {
            return Err(ModuleHubError::Forbidden {
                message: format!(
                    "You have no permission to {verb} this module. You are neither the owner \
                     nor a collaborator of {}",
                    repository.full_name
                ),
            });
        }

        Ok(repository)
    }
}

fn new_module(repository: &Repository) -> NewModule {
    NewModule {
        name: repository.name.clone(),
        description: repository.description.clone(),
        url: repository.html_url.clone(),
        owner: repository.owner.login.clone(),
        photo_url: repository.owner.avatar_url.clone(),
    }
}
