// src/main.rs

use anyhow::{bail, Context};
use clap::Parser;
use lark2md::{
    deliver, Action, AppError, CommandLineInput, CredentialProvider, DeliveryTarget, DocsGateway,
    DocsOutcome, DocumentSource, HttpConnector, LoginFlow, MediaStore, OAuthLogin,
    OutcomeComposer, OutcomeDelivery, OutputPlan, OutputReport, PipelineConfig, SessionStore,
    StaticToken,
};
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use serde_json::json;
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
///
/// Console output goes to stderr so stdout stays clean for the document.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("lark2md.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Retrieves, renders and delivers one document.
struct LarkToMarkdown<'a> {
    config: &'a PipelineConfig,
    gateway: DocsGateway,
}

impl<'a> LarkToMarkdown<'a> {
    fn new(config: &'a PipelineConfig) -> Result<Self, AppError> {
        let credentials: Arc<dyn CredentialProvider> = match &config.bearer_token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(SessionStore::new()),
        };
        let login: Arc<dyn LoginFlow> = Arc::new(OAuthLogin::new(config.oauth.clone())?);

        let gateway = DocsGateway::new(
            Arc::new(HttpConnector::new(config.api_domain.clone())),
            credentials,
            login,
            MediaStore::new(config.media_dir.clone()),
        )
        .with_media_base_url(config.media_base_url.clone())
        .with_resolve_options(config.resolve)
        .with_relogin_policy(config.relogin);

        Ok(Self { config, gateway })
    }

    fn report_completion(&self, outcome: &DocsOutcome, report: &OutputReport) {
        if let DocsOutcome::Success(doc) = outcome {
            log::info!(
                "Rendered {} blocks from {}",
                doc.blocks.len(),
                doc.document_id
            );
        }

        for completed in &report.completed {
            match &completed.operation {
                DeliveryTarget::WriteFile { path, .. } => {
                    eprintln!("✓ Document saved to {}", path.display());
                }
                DeliveryTarget::CopyToClipboard { .. } => {
                    eprintln!("✓ Document copied to clipboard");
                }
                DeliveryTarget::PrintToStdout { .. } => {}
            }
        }
    }
}

#[async_trait::async_trait]
impl DocumentSource for LarkToMarkdown<'_> {
    async fn fetch(&self, url: &str) -> DocsOutcome {
        self.gateway.docs(url).await
    }
}

impl OutcomeComposer for LarkToMarkdown<'_> {
    fn compose(&self, outcome: &DocsOutcome) -> Result<String, AppError> {
        match outcome {
            DocsOutcome::Success(doc) if !self.config.json => Ok(doc.content.clone()),
            other => Ok(serde_json::to_string_pretty(&other.to_json())?),
        }
    }
}

impl OutcomeDelivery for LarkToMarkdown<'_> {
    fn deliver(&self, text: String) -> Result<OutputReport, AppError> {
        deliver_text(self.config, text)
    }
}

/// Sends `text` to the configured outputs, stdout when none was requested.
fn deliver_text(config: &PipelineConfig, text: String) -> Result<OutputReport, AppError> {
    let mut plan = OutputPlan::new();

    if let Some(path) = &config.output_file {
        plan = plan.with_operation(DeliveryTarget::WriteFile {
            path: path.clone(),
            content: text.clone(),
        });
    }
    if config.clipboard {
        plan = plan.with_operation(DeliveryTarget::CopyToClipboard {
            content: text.clone(),
        });
    }
    if plan.is_empty() {
        plan = plan.with_operation(DeliveryTarget::PrintToStdout { content: text });
    }

    let report = deliver(plan)?;
    if !report.is_success() {
        return Err(AppError::DeliveryFailed {
            failures: report.failed.iter().map(|f| f.error.clone()).collect(),
        });
    }
    Ok(report)
}

async fn run_docs(config: &PipelineConfig, url: &str) -> anyhow::Result<()> {
    let pipeline = LarkToMarkdown::new(config)?;

    let outcome = pipeline.fetch(url).await;

    if !config.json {
        match &outcome {
            DocsOutcome::NeedsLogin { error, prompt, .. } => {
                eprintln!("{}\n\n{}\n\n{}", error, prompt.message, prompt.next_step);
                bail!("login required");
            }
            DocsOutcome::Failure { error, .. } => bail!("{}", error),
            DocsOutcome::Success(_) => {}
        }
    }

    let text = pipeline.compose(&outcome)?;
    let report = pipeline.deliver(text)?;
    pipeline.report_completion(&outcome, &report);

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_login(config: &PipelineConfig) -> anyhow::Result<()> {
    let login = OAuthLogin::new(config.oauth.clone())?;
    let prompt = login.begin().context("could not start login")?;

    let text = if config.json {
        serde_json::to_string_pretty(&prompt)?
    } else {
        format!("{}\n\n{}", prompt.message, prompt.next_step)
    };
    deliver_text(config, text)?;
    Ok(())
}

async fn run_exchange(config: &PipelineConfig, code: &str) -> anyhow::Result<()> {
    let login = OAuthLogin::new(config.oauth.clone())?;
    let session = SessionStore::new();
    let grant = login
        .exchange_code(code, &session)
        .await
        .context("token exchange failed")?;

    let text = if config.json {
        serde_json::to_string_pretty(&json!({
            "success": true,
            "access_token": grant.access_token.as_str(),
            "refresh_token": grant.refresh_token,
            "expires_in": grant.expires_in,
        }))?
    } else {
        let mut text = format!(
            "Login successful.\n\nexport LARK_BEARER_TOKEN={}",
            grant.access_token.as_str()
        );
        if let Some(expires_in) = grant.expires_in {
            text.push_str(&format!("\n\nThe token expires in {} seconds.", expires_in));
        }
        text
    };
    deliver_text(config, text)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).map_err(|e| anyhow::anyhow!("could not initialise logging: {}", e))?;

    let config = PipelineConfig::resolve(cli)?;

    match &config.action {
        Action::Docs { url } => run_docs(&config, url).await,
        Action::Login => run_login(&config),
        Action::Exchange { code } => run_exchange(&config, code).await,
    }
}
