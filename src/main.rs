//! Review Police entrypoint: webhook listener, relay consumer, and the
//! `show`/`accept` review commands.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use ortho_config::OrthoConfig;
use review_police::chat::{
    ChatError, ChatSink, DiscordChatSink, MentionResolver, SelectionResponder,
};
use review_police::github::{
    PersonalAccessToken, RepositoryLocator, ReviewRequestClassifier, format_review_requests,
};
use review_police::notifications::ChatSummonsEmitter;
use review_police::webhook::relay::RelayClient;
use review_police::webhook::{
    PULL_REQUEST_EVENT, PULL_REQUEST_REVIEW_EVENT, PullRequestHandler, ReviewHandler, listener,
};
use review_police::{
    AppError, Dispatcher, DispatcherBuilder, IdentityMapper, NotificationCorrelator,
    OctocrabPullRequestSource, OperationMode, PullRequestSource, ReviewAcceptance,
    ReviewPoliceConfig,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), AppError> {
    let config = load_config()?;
    let identities = Arc::new(IdentityMapper::load(config.mappings_path())?);
    let source = pull_request_source(&config)?;

    match config.operation_mode()? {
        OperationMode::Listen => {
            let dispatcher = dispatcher(&config, identities, source)?;
            listener::serve(&config.listen_addr, Arc::new(dispatcher)).await?;
            Ok(())
        }
        OperationMode::Relay => {
            let relay = RelayClient::new(config.require_relay_url()?)?;
            let dispatcher = dispatcher(&config, identities, source)?;
            relay.run(&dispatcher).await;
            Ok(())
        }
        OperationMode::Show => show(&config, &identities, source.as_ref()).await,
        OperationMode::Accept => accept(&config, identities, source).await,
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`AppError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<ReviewPoliceConfig, AppError> {
    ReviewPoliceConfig::load().map_err(|error| AppError::Configuration {
        message: error.to_string(),
    })
}

fn pull_request_source(
    config: &ReviewPoliceConfig,
) -> Result<Arc<dyn PullRequestSource>, AppError> {
    let (owner, repo) = config.require_repository()?;
    let locator = RepositoryLocator::new(owner, repo, config.github_api_base.as_deref())?;
    let token = PersonalAccessToken::new(config.resolve_github_token()?)?;
    Ok(Arc::new(OctocrabPullRequestSource::for_token(&token, locator)?))
}

fn chat_sink(config: &ReviewPoliceConfig) -> Result<Arc<dyn ChatSink>, AppError> {
    Ok(Arc::new(DiscordChatSink::new(config.require_discord()?)?))
}

fn dispatcher(
    config: &ReviewPoliceConfig,
    identities: Arc<IdentityMapper>,
    source: Arc<dyn PullRequestSource>,
) -> Result<Dispatcher, AppError> {
    let sink = chat_sink(config)?;
    let mentions = MentionResolver::new(identities, Arc::clone(&sink));
    let emitter = Arc::new(ChatSummonsEmitter::new(mentions.clone(), Arc::clone(&sink)));
    let correlator = NotificationCorrelator::new(emitter, config.correlator_settings());

    let pull_requests = PullRequestHandler::new(correlator, source, mentions.clone());
    let reviews = ReviewHandler::new(mentions, config.product_owner.clone());
    Ok(DispatcherBuilder::new(config.require_webhook_secret()?, sink)
        .register(PULL_REQUEST_EVENT, Arc::new(pull_requests))
        .register(PULL_REQUEST_REVIEW_EVENT, Arc::new(reviews))
        .build())
}

fn github_login<'mapper>(
    config: &ReviewPoliceConfig,
    identities: &'mapper IdentityMapper,
) -> Result<&'mapper str, AppError> {
    let user = config.require_user()?;
    identities
        .github_login_for(user)
        .ok_or_else(|| AppError::Configuration {
            message: format!("Discord user {user} has no GitHub account mapping"),
        })
}

async fn show(
    config: &ReviewPoliceConfig,
    identities: &IdentityMapper,
    source: &dyn PullRequestSource,
) -> Result<(), AppError> {
    let login = github_login(config, identities)?;
    let view = config.review_view()?;
    let requests = ReviewRequestClassifier::new(source)
        .review_requests(login, view)
        .await?;
    write_output(&format_review_requests(&requests, view))
}

async fn accept(
    config: &ReviewPoliceConfig,
    identities: Arc<IdentityMapper>,
    source: Arc<dyn PullRequestSource>,
) -> Result<(), AppError> {
    let actor = config.require_user()?.to_owned();
    let selections = config.require_pull_selections()?;
    let sink = chat_sink(config)?;
    let mentions = MentionResolver::new(identities, Arc::clone(&sink));
    let acceptance = ReviewAcceptance::new(source, mentions, sink);

    let report = acceptance
        .accept(&actor, &selections, &StdoutResponder)
        .await;
    for item in &report.items {
        write_output(&format!("#{}: {}", item.selection, item.line))?;
    }
    Ok(())
}

/// Prints the acknowledgement where a chat interaction would show it.
struct StdoutResponder;

#[async_trait]
impl SelectionResponder for StdoutResponder {
    async fn acknowledge(&self, content: &str) -> Result<(), ChatError> {
        write_output(content).map_err(|error| ChatError::Network {
            message: error.to_string(),
        })
    }
}

fn write_output(message: &str) -> Result<(), AppError> {
    writeln!(io::stdout().lock(), "{message}").map_err(|error| AppError::Io {
        message: error.to_string(),
    })
}
