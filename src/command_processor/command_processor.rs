use crate::clap_parser::{Command, MaintenanceState};
use crate::git::{GitRepo, remote_url};
use crate::heroku::{HerokuApi, Release, Toolbelt};
use crate::profile::profile::capitalized;
use crate::profile::{Application, Profile, ProfileManager, ProfileSettings};
use crate::promotion_graph::PromotionGraph;
use crate::secrets::SecretsManager;
use crate::settings::ToolSettings;
use crate::shell::{CommandRunner, SystemCommandRunner};
use crate::version::{
    LICENSE, PRODUCT_DESCRIPTION, PRODUCT_NAME, VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH,
};
use anyhow::{Context, Result};
use colored::Colorize;
use prettytable::{Table, row};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

const NONE: &str = "-";

/// Executes one parsed subcommand against the resolved settings.
pub struct CommandProcessor {
    settings: ToolSettings,
    secrets: SecretsManager,
    settings_source: Option<PathBuf>,
}

impl CommandProcessor {
    pub fn new(settings: ToolSettings, secrets: SecretsManager, settings_source: Option<PathBuf>) -> Self {
        Self {
            settings,
            secrets,
            settings_source,
        }
    }

    pub async fn process_command(&self, command: Command) -> Result<ExitCode> {
        info!("Processing command: {:?}", command);
        match command {
            Command::Info => self.info(),
            Command::Validate { names } => self.validate(&names).await,
            Command::List => self.list().await,
            Command::Show { name } => self.show(&name).await,
            Command::New {
                name,
                branch,
                upstream,
                force,
            } => self.new_profile(&name, &branch, upstream.as_deref(), force).await,
            Command::Edit { name } => self.edit(&name).await,
            Command::Release { name } => self.release(&name).await,
            Command::Changes { name, branch } => self.changes(&name, branch.as_deref()).await,
            Command::Tag { name, tag, message } => self.tag(&name, &tag, message.as_deref()).await,
            Command::Config { name } => self.config(&name).await,
            Command::Maintenance { name, state } => self.maintenance(&name, state).await,
            Command::Run { name, command } => self.run(&name, &command).await,
        }
    }

    fn profile_manager(&self) -> ProfileManager<'_> {
        ProfileManager::new(&self.settings.app_conf_dir)
    }

    fn git(&self) -> GitRepo<SystemCommandRunner> {
        GitRepo::new(&self.settings.git_work_dir, SystemCommandRunner)
    }

    fn api(&self) -> Result<HerokuApi> {
        let token = self.secrets.heroku_api_token()?;
        Ok(HerokuApi::new(&self.settings.heroku_api_url, token))
    }

    /// All loadable profiles as a graph. Files that fail to load are
    /// skipped with a warning so one bad file does not hide the rest.
    async fn load_graph(&self) -> Result<PromotionGraph> {
        let report = self.profile_manager().load_profiles_report().await?;
        for (path, error) in &report.failures {
            warn!("Skipping {}: {:#}", path.display(), error);
        }
        Ok(PromotionGraph::new(report.profiles)?)
    }

    fn info(&self) -> Result<ExitCode> {
        print_banner();

        let settings_file = self
            .settings_source
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(defaults)".to_string());
        let token = if self.secrets.has_heroku_api_token() {
            "set".green()
        } else {
            "not set".yellow()
        };

        println!("Settings file:    {}", settings_file);
        println!("Profiles:         {}", self.settings.app_conf_dir.display());
        println!("Git work tree:    {}", self.settings.git_work_dir.display());
        println!("Heroku API:       {}", self.settings.heroku_api_url);
        println!("Heroku API token: {}", token);
        println!(
            "Editor:           {}",
            self.settings.editor.as_deref().unwrap_or(NONE)
        );
        Ok(ExitCode::SUCCESS)
    }

    async fn validate(&self, names: &[String]) -> Result<ExitCode> {
        let manager = self.profile_manager();
        let report = manager.load_profiles_report().await?;
        let selected = |name: &str| names.is_empty() || names.iter().any(|n| n == name);

        let mut issues: Vec<String> = Vec::new();

        for name in names {
            let known = report.profiles.iter().any(|p| p.name() == name)
                || report.failures.iter().any(|(path, _)| file_stem(path) == *name);
            if !known {
                match manager.profile_path(name) {
                    Ok(path) => issues.push(format!("No profile file {}", path.display())),
                    Err(error) => issues.push(error.to_string()),
                }
            }
        }

        for (path, error) in &report.failures {
            if selected(file_stem(path).as_str()) {
                issues.push(format!("{:#}", error));
            }
        }

        let checked: Vec<String> = report
            .profiles
            .iter()
            .map(|p| p.name().to_string())
            .filter(|name| selected(name.as_str()))
            .collect();

        match PromotionGraph::new(report.profiles) {
            Ok(graph) => issues.extend(
                graph
                    .validate()
                    .into_iter()
                    .filter(|issue| names.is_empty() || names.iter().any(|n| issue.involves(n)))
                    .map(|issue| issue.to_string()),
            ),
            Err(error) => issues.push(error.to_string()),
        }

        for name in &checked {
            println!("{} {}", "✓".green(), name);
        }
        for issue in &issues {
            println!("{} {}", "✗".red(), issue.red());
        }

        if issues.is_empty() {
            println!(
                "{}",
                format!("{} profile(s) valid", checked.len()).green().bold()
            );
            Ok(ExitCode::SUCCESS)
        } else {
            println!(
                "{}",
                format!("{} issue(s) found", issues.len()).red().bold()
            );
            Ok(ExitCode::FAILURE)
        }
    }

    async fn list(&self) -> Result<ExitCode> {
        let graph = self.load_graph().await?;
        for issue in graph.validate() {
            warn!("{}", issue);
        }
        if graph.is_empty() {
            println!(
                "No profiles found in {}",
                self.settings.app_conf_dir.display()
            );
            return Ok(ExitCode::SUCCESS);
        }

        let mut table = Table::new();
        table.set_titles(row![
            "NAME",
            "BRANCH",
            "PIPELINE",
            "UPSTREAM",
            "DOWNSTREAM",
            "SETTINGS"
        ]);
        for profile in graph.promotion_order()? {
            table.add_row(row![
                profile.name(),
                profile.branch(),
                capitalized(profile.application.pipeline),
                profile.upstream().unwrap_or(NONE),
                joined_names(&graph.downstream_of(profile.name())),
                profile.settings.len()
            ]);
        }
        table.printstd();
        Ok(ExitCode::SUCCESS)
    }

    async fn show(&self, name: &str) -> Result<ExitCode> {
        // Load the requested profile strictly so its own errors surface.
        let profile = self.profile_manager().load_profile(name).await?;
        let graph = self.load_graph().await?;

        let upstream = match profile.upstream() {
            Some(upstream) if graph.contains(upstream) => upstream.to_string(),
            Some(upstream) => format!("{} {}", upstream, "(missing)".red()),
            None => NONE.to_string(),
        };

        println!("{} {}", "Application:".bold(), profile.name().bold());
        println!("  Branch:     {}", profile.branch());
        println!("  Pipeline:   {}", capitalized(profile.application.pipeline));
        println!("  Upstream:   {}", upstream);
        println!(
            "  Downstream: {}",
            joined_names(&graph.downstream_of(profile.name()))
        );
        println!("  Git remote: {}", remote_url(profile.name()));

        if profile.settings.is_empty() {
            println!("{} {}", "Settings:".bold(), NONE);
        } else {
            println!("{}", "Settings:".bold());
            let mut table = Table::new();
            table.set_titles(row!["KEY", "VALUE"]);
            for (key, value) in profile.settings.iter() {
                table.add_row(row![key, value]);
            }
            table.printstd();
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn new_profile(
        &self,
        name: &str,
        branch: &str,
        upstream: Option<&str>,
        force: bool,
    ) -> Result<ExitCode> {
        let manager = self.profile_manager();
        let profile = Profile::new(Application::new(name, branch, upstream), ProfileSettings::new());

        if let Some(upstream) = upstream {
            if manager.load_profile(upstream).await.is_err() {
                warn!("Upstream '{}' has no loadable profile yet", upstream);
            }
        }

        let path = manager.save_profile_to_file(&profile, force).await?;
        println!("{}", format!("Created profile: {}", path.display()).green());
        Ok(ExitCode::SUCCESS)
    }

    async fn edit(&self, name: &str) -> Result<ExitCode> {
        let path = self.profile_manager().profile_path(name)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(anyhow::anyhow!("No profile file {}", path.display()));
        }

        let editor = self.git().editor(self.settings.editor.as_deref()).await?;
        let mut words = editor.split_whitespace();
        let program = words.next().unwrap_or_default();
        let mut args: Vec<String> = words.map(str::to_string).collect();
        args.push(path.display().to_string());

        let status = SystemCommandRunner
            .interactive(program, &args)
            .await
            .with_context(|| format!("Failed to start editor: {}", editor))?;
        if status != 0 {
            return Err(anyhow::anyhow!("Editor exited with status {}", status));
        }

        // Re-check the edited file so mistakes show up straight away.
        match self.profile_manager().load_profile(name).await {
            Ok(_) => println!("{}", format!("Profile {} is valid", name).green()),
            Err(error) => println!("{}", format!("Profile {} is invalid: {:#}", name, error).red()),
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn release(&self, name: &str) -> Result<ExitCode> {
        let profile = self.profile_manager().load_profile(name).await?;
        let release = self
            .api()?
            .latest_deployment(profile.name())
            .await
            .with_context(|| format!("Failed to fetch releases of {}", profile.name()))?;

        println!("{}", release.to_string().bold());
        print_release_table(&release);
        Ok(ExitCode::SUCCESS)
    }

    async fn changes(&self, name: &str, branch: Option<&str>) -> Result<ExitCode> {
        let profile = self.profile_manager().load_profile(name).await?;
        let branch = branch.unwrap_or(profile.branch());

        let release = self
            .api()?
            .latest_deployment(profile.name())
            .await
            .with_context(|| format!("Failed to fetch releases of {}", profile.name()))?;
        let deployed = release.commit().with_context(|| {
            format!(
                "Release v{} of {} does not name a commit: {}",
                release.version,
                release.application(),
                release.description
            )
        })?;

        let git = self.git();
        let head = git.branch_head(branch).await?;
        println!("{}", release.to_string().bold());
        println!("Branch {} is at {}", branch, head);

        if head.starts_with(deployed) || deployed.starts_with(head.as_str()) {
            println!("{}", format!("{} is up to date with {}", profile.name(), branch).green());
            return Ok(ExitCode::SUCCESS);
        }

        let commits = git.commits(deployed, &head).await?;
        let files = git.files(deployed, &head).await?;

        println!(
            "{}",
            format!("{} commit(s) not yet deployed:", commits.len()).bold()
        );
        let mut table = Table::new();
        table.set_titles(row!["COMMIT", "MESSAGE"]);
        for commit in &commits {
            table.add_row(row![commit.hash, commit.message]);
        }
        table.printstd();

        println!("{}", format!("{} file(s) changed:", files.len()).bold());
        for file in &files {
            println!("  {}", file);
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn tag(&self, name: &str, tag: &str, message: Option<&str>) -> Result<ExitCode> {
        let profile = self.profile_manager().load_profile(name).await?;
        let release = self
            .api()?
            .latest_deployment(profile.name())
            .await
            .with_context(|| format!("Failed to fetch releases of {}", profile.name()))?;
        let commit = release.commit().with_context(|| {
            format!(
                "Release v{} of {} does not name a commit: {}",
                release.version,
                release.application(),
                release.description
            )
        })?;

        let message = message.map(str::to_string).unwrap_or_else(|| {
            format!("Deployed to {} in release v{}", release.application(), release.version)
        });
        self.git().apply_tag(commit, tag, &message).await?;
        println!("{}", format!("Tagged {} as {}", commit, tag).green());
        Ok(ExitCode::SUCCESS)
    }

    async fn config(&self, name: &str) -> Result<ExitCode> {
        let profile = self.profile_manager().load_profile(name).await?;
        let config_vars = self
            .api()?
            .config_vars(profile.name())
            .await
            .with_context(|| format!("Failed to fetch config vars of {}", profile.name()))?;

        let mut table = Table::new();
        table.set_titles(row!["KEY", "VALUE"]);
        for (key, value) in &config_vars {
            table.add_row(row![key, value]);
        }
        table.printstd();
        Ok(ExitCode::SUCCESS)
    }

    async fn maintenance(&self, name: &str, state: MaintenanceState) -> Result<ExitCode> {
        let profile = self.profile_manager().load_profile(name).await?;
        let output = Toolbelt::new(SystemCommandRunner)
            .toggle_maintenance(profile.name(), state.is_on())
            .await?;
        print!("{}", output);
        Ok(ExitCode::SUCCESS)
    }

    async fn run(&self, name: &str, command: &[String]) -> Result<ExitCode> {
        let profile = self.profile_manager().load_profile(name).await?;
        let status = Toolbelt::new(SystemCommandRunner)
            .run_command(profile.name(), command)
            .await?;
        if status != 0 {
            warn!("heroku run exited with status {}", status);
        }
        Ok(exit_code(status))
    }
}

fn print_banner() {
    println!(
        "{} {}.{}.{} ({} licence)",
        PRODUCT_NAME.bold(),
        VERSION_MAJOR,
        VERSION_MINOR,
        VERSION_PATCH,
        LICENSE
    );
    println!("{}", PRODUCT_DESCRIPTION.dimmed());
    println!();
}

/// Exit statuses outside 1..=255 collapse to a plain failure.
fn exit_code(status: i32) -> ExitCode {
    match status {
        0 => ExitCode::SUCCESS,
        1..=255 => ExitCode::from(status as u8),
        _ => ExitCode::FAILURE,
    }
}

fn print_release_table(release: &Release) {
    let deployed_at = release
        .deployed_at()
        .map(|at| at.to_rfc2822())
        .unwrap_or_else(|_| release.updated_at.clone());

    let mut table = Table::new();
    table.add_row(row!["Application", release.application()]);
    table.add_row(row!["Version", release.version]);
    table.add_row(row!["Commit", release.commit().unwrap_or(NONE)]);
    table.add_row(row!["Description", release.description]);
    table.add_row(row!["Deployed by", release.deployed_by()]);
    table.add_row(row!["Deployed at", deployed_at]);
    table.printstd();
}

fn joined_names(profiles: &[&Profile]) -> String {
    if profiles.is_empty() {
        return NONE.to_string();
    }
    profiles
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_exit_status_becomes_the_exit_code() {
        assert_eq!(exit_code(0), ExitCode::SUCCESS);
        assert_eq!(exit_code(3), ExitCode::from(3));
        assert_eq!(exit_code(-1), ExitCode::FAILURE);
        assert_eq!(exit_code(300), ExitCode::FAILURE);
    }
}
