//! 配線: 標準アダプタで ChatApp を組み立てる

use std::path::PathBuf;
use std::sync::Arc;

use common::adapter::{FileJsonLog, NoopLog, StderrLog, StdFileSystem, TeeLog};
use common::error::Error;
use common::llm::{create_provider, load_profiles_config, resolve_provider, LlmProvider};
use common::ports::outbound::{FileSystem, Log, LogLevel};

use crate::adapter::{load_priming, FileMemoryStore, LlmChatCompletion, LlmSummarizer};
use crate::cli::Config;
use crate::domain::MemoryConfig;
use crate::usecase::{ChatApp, ChatUseCase, CompactionUseCase, MemoryPersistence};

/// profiles.json の場所を指す環境変数
pub const PROFILES_ENV: &str = "CHAT_PROFILES";

/// 配線で組み立てたもの（main の Runner で利用）
pub struct App {
    pub chat_app: ChatApp,
    pub memory_config: MemoryConfig,
    /// 使ったプロファイル名（lifecycle ログ用）
    pub profile_name: String,
    pub logger: Arc<dyn Log>,
}

/// --log-file と -v からロガーを作る。どちらも無ければ NoopLog
pub fn build_logger(fs: &Arc<dyn FileSystem>, log_file: Option<&PathBuf>, verbose: bool) -> Arc<dyn Log> {
    let mut sinks: Vec<Arc<dyn Log>> = Vec::new();
    if let Some(path) = log_file {
        sinks.push(Arc::new(FileJsonLog::new(Arc::clone(fs), path)));
    }
    if verbose {
        sinks.push(Arc::new(StderrLog::new(LogLevel::Debug)));
    }
    match sinks.len() {
        0 => Arc::new(NoopLog),
        1 => sinks.remove(0),
        _ => Arc::new(TeeLog::new(sinks)),
    }
}

/// 配線: 標準アダプタで App を組み立てる
pub fn wire_chat(config: &Config) -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let logger = build_logger(&fs, config.log_file.as_ref(), config.verbose);
    let memory_config = config.memory_config()?;

    let profiles = match std::env::var(PROFILES_ENV) {
        Ok(path) if !path.is_empty() => load_profiles_config(fs.as_ref(), &PathBuf::from(path))?,
        _ => None,
    };
    let resolved = resolve_provider(config.profile.as_deref(), profiles.as_ref())?;
    let provider: Arc<dyn LlmProvider> = Arc::new(create_provider(
        resolved.provider_type,
        config.model.clone().or(resolved.model),
        resolved.base_url,
        resolved.api_key_env,
        resolved.temperature,
    )?);

    let priming = load_priming(fs.as_ref(), &config.prompt, &config.csv)?;
    let compaction = CompactionUseCase::new(
        Arc::new(LlmSummarizer::new(Arc::clone(&provider))),
        Arc::clone(&logger),
    );
    let chat = ChatUseCase::new(
        Arc::new(LlmChatCompletion::new(provider)),
        compaction,
        Some(priming),
        Arc::clone(&logger),
    );
    let store = FileMemoryStore::new(Arc::clone(&fs), &config.memory_file, Arc::clone(&logger));
    let persistence = MemoryPersistence::new(Arc::new(store), Arc::clone(&logger));

    Ok(App {
        chat_app: ChatApp::new(chat, persistence, Arc::clone(&logger)),
        memory_config,
        profile_name: resolved.profile_name,
        logger,
    })
}
