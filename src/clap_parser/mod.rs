use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = crate::version::PRODUCT_DESCRIPTION)]
pub struct Args {
    /// Settings file [default: heroku-tools.yml, if present]
    #[arg(long, short, global = true)]
    pub settings: Option<PathBuf>,

    /// Directory holding the <name>.conf application profiles
    #[arg(long, short = 'c', global = true)]
    pub conf_dir: Option<PathBuf>,

    /// Work tree of the git repository being deployed
    #[arg(long, short = 'w', global = true)]
    pub work_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show version and resolved settings
    Info,
    /// Check profiles and the promotion graph they form
    Validate {
        /// Only report on these profiles
        names: Vec<String>,
    },
    /// List profiles in promotion order
    List,
    /// Show one profile with its upstream and downstream applications
    Show { name: String },
    /// Write a new profile
    New {
        name: String,
        #[arg(long, short, default_value = "master")]
        branch: String,
        /// Application this one is promoted from; enables the pipeline
        #[arg(long, short)]
        upstream: Option<String>,
        /// Replace an existing profile file
        #[arg(long)]
        force: bool,
    },
    /// Open a profile in the configured editor
    Edit { name: String },
    /// Show the latest deployment of an application
    Release { name: String },
    /// Show commits and files not yet deployed to an application
    Changes {
        name: String,
        /// Compare against this branch instead of the profile's
        #[arg(long, short)]
        branch: Option<String>,
    },
    /// Tag the commit currently deployed to an application
    Tag {
        name: String,
        tag: String,
        /// Tag message [default: names the application and release]
        #[arg(long, short)]
        message: Option<String>,
    },
    /// Show the config vars currently set on an application
    Config { name: String },
    /// Turn maintenance mode on or off
    Maintenance {
        name: String,
        #[arg(value_enum)]
        state: MaintenanceState,
    },
    /// Run a one-off command on an application dyno
    Run {
        name: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaintenanceState {
    On,
    Off,
}

impl MaintenanceState {
    pub fn is_on(self) -> bool {
        self == MaintenanceState::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let args = Args::try_parse_from(["heroku-tools", "list", "-c", "apps", "-vv"]).unwrap();
        assert_eq!(args.conf_dir, Some(PathBuf::from("apps")));
        assert_eq!(args.verbose, 2);
        assert_eq!(args.command, Command::List);
    }

    #[test]
    fn new_defaults_to_master() {
        let args = Args::try_parse_from(["heroku-tools", "new", "my-app-dev"]).unwrap();
        assert_eq!(
            args.command,
            Command::New {
                name: "my-app-dev".to_string(),
                branch: "master".to_string(),
                upstream: None,
                force: false,
            }
        );
    }

    #[test]
    fn run_keeps_the_remote_command_intact() {
        let args = Args::try_parse_from([
            "heroku-tools", "run", "my-app-prod", "python", "manage.py", "migrate", "--noinput",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Run {
                name: "my-app-prod".to_string(),
                command: vec![
                    "python".to_string(),
                    "manage.py".to_string(),
                    "migrate".to_string(),
                    "--noinput".to_string()
                ],
            }
        );
    }

    #[test]
    fn maintenance_state_is_on_or_off() {
        let args = Args::try_parse_from(["heroku-tools", "maintenance", "my-app-prod", "on"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Maintenance { state: MaintenanceState::On, .. }
        ));
        assert!(Args::try_parse_from(["heroku-tools", "maintenance", "my-app-prod", "maybe"]).is_err());
    }

    #[test]
    fn tag_message_is_optional() {
        let args = Args::try_parse_from(["heroku-tools", "tag", "my-app-prod", "prod-v12"]).unwrap();
        assert_eq!(
            args.command,
            Command::Tag {
                name: "my-app-prod".to_string(),
                tag: "prod-v12".to_string(),
                message: None,
            }
        );
    }
}
