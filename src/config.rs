// src/config.rs
use crate::auth::{default_redirect_uri, OAuthSettings};
use crate::constants::{DEFAULT_API_DOMAIN, DEFAULT_AUTH_DOMAIN, DEFAULT_MEDIA_DIR, MAX_MEDIA_CONCURRENCY};
use crate::error::AppError;
use crate::gateway::ReloginPolicy;
use crate::media::ResolveOptions;
use crate::types::{BearerToken, MediaBaseUrl, ValidationError};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Bearer token to use instead of LARK_BEARER_TOKEN
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Emit the full result object as JSON instead of the markdown alone
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Write the output to this file
    #[arg(short, long, global = true)]
    pub output_file: Option<String>,

    /// Copy the output to the clipboard
    #[arg(short = 'b', long, global = true, default_value_t = false)]
    pub clipboard: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Fetch a document and render it as markdown
    ///
    /// Authenticates with --token or LARK_BEARER_TOKEN. Sessions are not
    /// kept between invocations, so without either of them the command
    /// answers with a login prompt. Complete the login with `exchange` and
    /// export the token it prints.
    Docs(DocsArgs),
    /// Start an interactive OAuth login
    Login,
    /// Exchange an authorization code for a user access token
    ///
    /// The token is printed, not saved. Export it as LARK_BEARER_TOKEN for
    /// later `docs` invocations.
    Exchange {
        /// The `code` query parameter from the OAuth redirect
        #[arg(long)]
        code: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct DocsArgs {
    /// Lark document URL (e.g., "https://example.larksuite.com/docx/doxcnAbc")
    pub url: String,

    /// Directory downloaded images and board snapshots are stored in
    #[arg(long)]
    pub media_dir: Option<String>,

    /// Public URL prefix the media directory is served under
    #[arg(long)]
    pub media_base_url: Option<String>,

    /// Media tokens resolved concurrently per resource class (1 = sequential)
    #[arg(long, default_value_t = 1)]
    pub concurrency: u32,

    /// Which failures discard the token and request a new login
    #[arg(long, value_enum, default_value_t = ReloginArg::Any)]
    pub relogin: ReloginArg,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloginArg {
    /// Any failed retrieval
    Any,
    /// Only authentication failures
    AuthOnly,
}

impl From<ReloginArg> for ReloginPolicy {
    fn from(arg: ReloginArg) -> Self {
        match arg {
            ReloginArg::Any => ReloginPolicy::AnyFailure,
            ReloginArg::AuthOnly => ReloginPolicy::AuthFailuresOnly,
        }
    }
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Docs { url: String },
    Login,
    Exchange { code: String },
}

/// Resolved configuration, validated and ready to drive the gateway.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub action: Action,
    pub bearer_token: Option<BearerToken>,
    pub api_domain: String,
    pub oauth: OAuthSettings,
    pub media_dir: PathBuf,
    pub media_base_url: MediaBaseUrl,
    pub resolve: ResolveOptions,
    pub relogin: ReloginPolicy,
    pub json: bool,
    pub output_file: Option<PathBuf>,
    pub clipboard: bool,
    pub verbose: bool,
}

impl PipelineConfig {
    /// Resolves a complete configuration from CLI input and the process environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with(cli, |key| std::env::var(key).ok())
    }

    /// Resolves a configuration, reading environment variables through `env`.
    pub fn resolve_with<F>(cli: CommandLineInput, env: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let bearer_token = cli
            .token
            .or_else(|| non_empty("LARK_BEARER_TOKEN"))
            .map(BearerToken::new)
            .transpose()?;

        let api_domain = non_empty("LARK_API_DOMAIN").unwrap_or_else(|| DEFAULT_API_DOMAIN.to_string());
        let oauth = OAuthSettings {
            client_id: non_empty("LARK_CLIENT_ID"),
            client_secret: non_empty("LARK_CLIENT_SECRET"),
            redirect_uri: non_empty("LARK_REDIRECT_URI").unwrap_or_else(default_redirect_uri),
            auth_domain: non_empty("LARK_DOMAIN").unwrap_or_else(|| DEFAULT_AUTH_DOMAIN.to_string()),
            api_domain: api_domain.clone(),
        };

        let mut config = PipelineConfig {
            action: Action::Login,
            bearer_token,
            api_domain,
            oauth,
            media_dir: PathBuf::from(DEFAULT_MEDIA_DIR),
            media_base_url: MediaBaseUrl::default(),
            resolve: ResolveOptions::default(),
            relogin: ReloginPolicy::default(),
            json: cli.json,
            output_file: cli.output_file.map(PathBuf::from),
            clipboard: cli.clipboard,
            verbose: cli.verbose,
        };

        match cli.command {
            CliCommand::Docs(args) => {
                if args.concurrency == 0 || args.concurrency > MAX_MEDIA_CONCURRENCY {
                    return Err(ValidationError::OutOfBounds {
                        value: args.concurrency,
                        min: 1,
                        max: MAX_MEDIA_CONCURRENCY,
                    }
                    .into());
                }
                if let Some(dir) = args.media_dir {
                    config.media_dir = PathBuf::from(dir);
                }
                if let Some(base) = args.media_base_url {
                    config.media_base_url = MediaBaseUrl::parse(&base)?;
                }
                config.resolve = ResolveOptions {
                    concurrency: args.concurrency as usize,
                };
                config.relogin = args.relogin.into();
                config.action = Action::Docs { url: args.url };
            }
            CliCommand::Login => {}
            CliCommand::Exchange { code } => config.action = Action::Exchange { code },
        }

        Ok(config)
    }
}
