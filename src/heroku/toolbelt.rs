use crate::heroku::heroku_error::HerokuError;
use crate::shell::{CommandRunner, command_line};

const HEROKU: &str = "heroku";

/// Runs Heroku Toolbelt commands against a named application.
pub struct Toolbelt<R> {
    runner: R,
}

impl<R: CommandRunner> Toolbelt<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// `heroku <command> --app <application>`, returning stdout.
    pub async fn run_cmd(&self, application: &str, command: &[String]) -> Result<String, HerokuError> {
        let args = app_args(application, command);

        let output = self
            .runner
            .output(HEROKU, &args)
            .await
            .map_err(|source| HerokuError::Spawn {
                command: command_line(HEROKU, &args),
                source,
            })?;

        if !output.success() {
            return Err(HerokuError::Command {
                command: command_line(HEROKU, &args),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// One-off dyno command, e.g. `python manage.py migrate`, attached to
    /// the terminal so prompts and shells work. Returns the exit status.
    pub async fn run_command(&self, application: &str, command: &[String]) -> Result<i32, HerokuError> {
        let mut run = vec!["run".to_string()];
        run.extend_from_slice(command);
        let args = app_args(application, &run);

        self.runner
            .interactive(HEROKU, &args)
            .await
            .map_err(|source| HerokuError::Spawn {
                command: command_line(HEROKU, &args),
                source,
            })
    }

    pub async fn toggle_maintenance(&self, application: &str, maintenance_on: bool) -> Result<String, HerokuError> {
        let on_off = if maintenance_on { "on" } else { "off" };
        self.run_cmd(application, &[format!("maintenance:{on_off}")])
            .await
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

fn app_args(application: &str, command: &[String]) -> Vec<String> {
    let mut args = command.to_vec();
    args.push("--app".to_string());
    args.push(application.to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::command_runner::testing::ScriptedRunner;

    #[tokio::test]
    async fn maintenance_toggles_on_and_off() {
        let toolbelt = Toolbelt::new(
            ScriptedRunner::new()
                .respond(0, "Enabling maintenance mode for my-app-prod... done\n", "")
                .respond(0, "Disabling maintenance mode for my-app-prod... done\n", ""),
        );

        let out = toolbelt.toggle_maintenance("my-app-prod", true).await.unwrap();
        assert!(out.contains("Enabling"));
        toolbelt.toggle_maintenance("my-app-prod", false).await.unwrap();

        assert_eq!(
            toolbelt.runner().calls(),
            vec![
                "heroku maintenance:on --app my-app-prod",
                "heroku maintenance:off --app my-app-prod",
            ]
        );
    }

    #[tokio::test]
    async fn run_command_goes_through_heroku_run() {
        let toolbelt = Toolbelt::new(ScriptedRunner::new().respond(0, "", "").respond(3, "", ""));
        let command: Vec<String> = ["python", "manage.py", "migrate"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(toolbelt.run_command("my-app-prod", &command).await.unwrap(), 0);
        // A failing dyno command is an exit status, not an error.
        assert_eq!(toolbelt.run_command("my-app-prod", &command).await.unwrap(), 3);
        assert_eq!(
            toolbelt.runner().calls(),
            vec![
                "heroku run python manage.py migrate --app my-app-prod",
                "heroku run python manage.py migrate --app my-app-prod",
            ]
        );
    }

    #[tokio::test]
    async fn failure_carries_command_and_stderr() {
        let toolbelt = Toolbelt::new(ScriptedRunner::new().respond(1, "", " !    Couldn't find that app.\n"));
        let err = toolbelt.toggle_maintenance("nope", true).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error running Heroku command 'heroku maintenance:on --app nope': !    Couldn't find that app."
        );
    }

    #[tokio::test]
    async fn missing_toolbelt_is_a_spawn_error() {
        let toolbelt = Toolbelt::new(ScriptedRunner::new());
        let err = toolbelt.toggle_maintenance("my-app-prod", true).await.unwrap_err();
        assert!(matches!(err, HerokuError::Spawn { .. }));
    }
}
